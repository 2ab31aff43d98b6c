//! `ytup caption` – attach one caption track to an existing video.

use anyhow::{bail, Context, Result};
use std::path::Path;
use ytup_core::auth::SCOPE_FORCE_SSL;
use ytup_core::captions::{CaptionInserter, CaptionTrack};
use ytup_core::config::YtupConfig;
use ytup_core::youtube::YouTubeClient;

use super::credentials::Credentials;

pub fn run_caption(
    video_id: &str,
    language: &str,
    name: &str,
    file: &Path,
    creds: &Credentials,
    cfg: &YtupConfig,
) -> Result<()> {
    if !file.exists() {
        bail!("Caption file not found: {}", file.display());
    }

    let token = creds.access_token(&[SCOPE_FORCE_SSL])?;
    let client = YouTubeClient::new(token).with_upload_base(cfg.upload_base());
    let track = CaptionTrack {
        language: language.to_string(),
        name: name.to_string(),
        path: file.to_path_buf(),
    };

    println!("Uploading caption: {} ({})...", track.name, track.language);
    let resource = client
        .insert_caption(video_id, &track)
        .with_context(|| format!("uploading caption to video {}", video_id))?;

    println!("✓ Caption uploaded successfully!");
    println!("  Caption ID: {}", resource.id);
    println!("  Track Name: {}", resource.snippet.name);
    println!("  Language: {}", resource.snippet.language);
    println!("\n✓ Done!");
    Ok(())
}
