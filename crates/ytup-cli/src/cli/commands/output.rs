//! Console output for upload progress and caption batches.

use ytup_core::captions::{CaptionEvent, CaptionSummary};
use ytup_core::retry::DriveEvent;
use ytup_core::upload::UploadError;

const RULE_WIDTH: usize = 80;

pub fn banner(title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("{}", rule);
    println!("{}", title);
    println!("{}", rule);
}

pub fn print_drive_event(event: &DriveEvent) {
    for line in drive_event_lines(event) {
        println!("{}", line);
    }
}

fn drive_event_lines(event: &DriveEvent) -> Vec<String> {
    match event {
        DriveEvent::Attempt { .. } => vec!["Uploading file...".to_string()],
        DriveEvent::Progress(p) => vec![format!(
            "Uploaded {:.1}% ({} of {} bytes)",
            p.percent(),
            p.bytes_sent,
            p.total_bytes
        )],
        DriveEvent::Retrying { error, sleep, .. } => vec![
            error.clone(),
            format!("Sleeping {:.2} seconds and then retrying...", sleep.as_secs_f64()),
        ],
        DriveEvent::Completed { id } => {
            vec![format!("Video id '{}' was successfully uploaded.", id)]
        }
    }
}

/// Closing line of `ytup upload`.
pub fn completion_message(captions: Option<&CaptionSummary>) -> String {
    match captions {
        Some(summary) if !summary.all_succeeded() => format!(
            "⚠ Video uploaded, but {} of {} caption tracks failed.",
            summary.attempted - summary.succeeded,
            summary.attempted
        ),
        _ => "✓ All operations completed successfully!".to_string(),
    }
}

pub fn print_caption_event(event: CaptionEvent<'_>) {
    match event {
        CaptionEvent::Invalid { arg, .. } => {
            println!("\n✗ Invalid caption format: '{}'", arg);
            println!("  Use format: language:filepath or language:name:filepath");
        }
        CaptionEvent::MissingFile { track } => {
            println!("\n✗ Caption file not found: {}", track.path.display());
        }
        CaptionEvent::Uploading {
            index,
            total,
            track,
        } => {
            println!("\nProcessing caption {}/{}:", index, total);
            println!("  Uploading caption: {} ({})...", track.name, track.language);
        }
        CaptionEvent::Uploaded { resource, .. } => {
            println!("  ✓ Caption '{}' uploaded successfully.", resource.snippet.name);
            println!("    Caption ID: {}", resource.id);
        }
        CaptionEvent::Failed { error, .. } => match error {
            UploadError::Http { status, body } => {
                println!("  ✗ HTTP error {} while uploading caption:", status);
                println!("    {}", body);
            }
            other => println!("  ✗ Error uploading caption: {}", other),
        },
    }
}
