//! Tests for `ytup upload`.

use super::parse;
use crate::cli::{Cli, CliCommand, UploadArgs};
use clap::Parser;
use std::path::PathBuf;
use ytup_core::metadata::PrivacyStatus;

fn upload(args: &[&str]) -> UploadArgs {
    match parse(args) {
        CliCommand::Upload(a) => a,
        other => panic!("expected Upload, got {:?}", other),
    }
}

#[test]
fn cli_parse_upload_defaults() {
    let a = upload(&["ytup", "upload", "--file", "video.mp4"]);
    assert_eq!(a.file, PathBuf::from("video.mp4"));
    assert_eq!(a.title, "Test Title");
    assert_eq!(a.description, "Test Description");
    assert_eq!(a.category, "22");
    assert_eq!(a.keywords, "");
    assert_eq!(a.privacy_status, PrivacyStatus::Public);
    assert!(a.captions.is_empty());
    assert!(a.chunk_size.is_none());
}

#[test]
fn cli_parse_upload_all_fields() {
    let a = upload(&[
        "ytup",
        "upload",
        "--file",
        "talk.mkv",
        "--title",
        "My Talk",
        "--description",
        "Slides in the description",
        "--category",
        "28",
        "--keywords",
        "rust,talk",
        "--privacy-status",
        "unlisted",
        "--chunk-size",
        "1048576",
    ]);
    assert_eq!(a.title, "My Talk");
    assert_eq!(a.category, "28");
    assert_eq!(a.keywords, "rust,talk");
    assert_eq!(a.privacy_status, PrivacyStatus::Unlisted);
    assert_eq!(a.chunk_size, Some(1_048_576));
}

#[test]
fn cli_parse_upload_privacy_status_camel_case_alias() {
    let a = upload(&[
        "ytup",
        "upload",
        "--file",
        "v.mp4",
        "--privacyStatus",
        "private",
    ]);
    assert_eq!(a.privacy_status, PrivacyStatus::Private);
}

#[test]
fn cli_parse_upload_rejects_unknown_privacy_status() {
    let res = Cli::try_parse_from([
        "ytup",
        "upload",
        "--file",
        "v.mp4",
        "--privacy-status",
        "secret",
    ]);
    assert!(res.is_err());
}

#[test]
fn cli_parse_upload_multiple_captions() {
    let a = upload(&[
        "ytup",
        "upload",
        "--file",
        "v.mp4",
        "--captions",
        "en:english.srt",
        "es:Spanish:spanish.srt",
        "hi:hindi.srt",
    ]);
    assert_eq!(
        a.captions,
        vec!["en:english.srt", "es:Spanish:spanish.srt", "hi:hindi.srt"]
    );
}

#[test]
fn cli_parse_upload_requires_file() {
    assert!(Cli::try_parse_from(["ytup", "upload"]).is_err());
}
