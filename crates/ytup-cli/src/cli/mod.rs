//! CLI for ytup: resumable video uploads and caption tracks.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use ytup_core::config;
use ytup_core::metadata::PrivacyStatus;

use commands::{run_auth, run_caption, run_upload, Credentials};

/// Top-level CLI for ytup.
#[derive(Debug, Parser)]
#[command(name = "ytup")]
#[command(about = "ytup: upload videos and caption tracks to YouTube", long_about = None)]
pub struct Cli {
    /// OAuth client secrets file (overrides config).
    #[arg(long, global = true, value_name = "PATH")]
    pub client_secrets: Option<PathBuf>,

    /// Where to keep the OAuth token (overrides config).
    #[arg(long, global = true, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    /// Paste the authorization code instead of capturing the browser
    /// redirect on a local port.
    #[arg(long, global = true, alias = "noauth_local_webserver")]
    pub noauth_local_webserver: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Upload a video, then attach any caption tracks to it.
    Upload(UploadArgs),

    /// Attach one caption track to an existing video.
    Caption {
        /// Existing YouTube video ID.
        #[arg(long)]
        video_id: String,
        /// Language code (e.g. en, es, hi).
        #[arg(long)]
        language: String,
        /// Caption track name.
        #[arg(long)]
        name: String,
        /// Caption file (.srt, .sbv, .vtt).
        #[arg(long)]
        file: PathBuf,
    },

    /// Run the OAuth flow and store the token.
    Auth,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Video file to upload.
    #[arg(long)]
    pub file: PathBuf,

    /// Video title.
    #[arg(long, default_value = "Test Title")]
    pub title: String,

    /// Video description.
    #[arg(long, default_value = "Test Description")]
    pub description: String,

    /// Numeric video category.
    #[arg(long, default_value = "22")]
    pub category: String,

    /// Video keywords, comma separated.
    #[arg(long, default_value = "")]
    pub keywords: String,

    /// Video privacy status: public, private or unlisted.
    #[arg(long, visible_alias = "privacyStatus", default_value = "public")]
    pub privacy_status: PrivacyStatus,

    /// Caption tracks as `lang:path` or `lang:name:path`, e.g. `en:english.srt es:Spanish:spanish.srt`.
    #[arg(long, num_args = 1.., value_name = "LANG:[NAME:]PATH")]
    pub captions: Vec<String>,

    /// Bytes per resumable chunk, rounded down to 256 KiB. Default: whole file.
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<u64>,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let creds = Credentials::resolve(
            cli.client_secrets,
            cli.token_file,
            cli.noauth_local_webserver,
            &cfg,
        );

        match cli.command {
            CliCommand::Upload(args) => run_upload(&args, &creds, &cfg)?,
            CliCommand::Caption {
                video_id,
                language,
                name,
                file,
            } => run_caption(&video_id, &language, &name, &file, &creds, &cfg)?,
            CliCommand::Auth => run_auth(&creds)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
