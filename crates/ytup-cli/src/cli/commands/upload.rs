//! `ytup upload` – resumable video upload followed by caption tracks.

use anyhow::{bail, Context, Result};
use ytup_core::auth::{SCOPE_FORCE_SSL, SCOPE_UPLOAD};
use ytup_core::captions::upload_captions;
use ytup_core::config::YtupConfig;
use ytup_core::metadata::VideoMetadata;
use ytup_core::retry::UploadDriver;
use ytup_core::youtube::{watch_url, YouTubeClient};

use super::credentials::Credentials;
use super::output::{banner, completion_message, print_caption_event, print_drive_event};
use crate::cli::UploadArgs;

pub fn run_upload(args: &UploadArgs, creds: &Credentials, cfg: &YtupConfig) -> Result<()> {
    if !args.file.is_file() {
        bail!(
            "Please specify a valid file using the --file parameter ({} not found)",
            args.file.display()
        );
    }

    let token = creds.access_token(&[SCOPE_UPLOAD, SCOPE_FORCE_SSL])?;
    let client = YouTubeClient::new(token).with_upload_base(cfg.upload_base());
    let metadata = VideoMetadata {
        title: args.title.clone(),
        description: args.description.clone(),
        tags: VideoMetadata::parse_keywords(&args.keywords),
        category_id: args.category.clone(),
        privacy_status: args.privacy_status,
    };

    banner("STEP 1: Uploading Video");
    let chunk_size = args.chunk_size.or(cfg.chunk_size_bytes);
    let mut session = client
        .begin_video_upload(&metadata, &args.file, chunk_size)
        .with_context(|| format!("opening {}", args.file.display()))?;

    let policy = cfg.retry_policy();
    let outcome = UploadDriver::new(&policy)
        .on_event(print_drive_event)
        .drive(&mut session)
        .context("video upload failed")?;
    let video_id = outcome.id;

    println!("\n✓ Video uploaded successfully!");
    println!("  Video ID: {}", video_id);
    println!("  Video URL: {}", watch_url(&video_id));

    let captions = if args.captions.is_empty() {
        println!("\nNo captions specified. Skipping caption upload.");
        None
    } else {
        println!();
        banner("STEP 2: Uploading Captions");
        let summary = upload_captions(&client, &video_id, &args.captions, print_caption_event);
        println!();
        banner(&format!(
            "Caption Upload Complete: {}/{} successful",
            summary.succeeded, summary.attempted
        ));
        Some(summary)
    };

    println!("\n{}", completion_message(captions.as_ref()));
    Ok(())
}
