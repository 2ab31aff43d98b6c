//! Parse `language:filepath` / `language:name:filepath` caption arguments.

use super::CaptionTrack;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptionArgError {
    #[error("invalid caption format: '{0}' (use language:filepath or language:name:filepath)")]
    InvalidFormat(String),
}

/// Parse a caption argument.
///
/// Splits on at most the first two colons, so the file path may itself
/// contain colons in the three-part form. The track name defaults to the
/// uppercased language code.
pub fn parse_caption_arg(arg: &str) -> Result<CaptionTrack, CaptionArgError> {
    let invalid = || CaptionArgError::InvalidFormat(arg.to_string());
    let parts: Vec<&str> = arg.splitn(3, ':').collect();
    let (language, name, path) = match parts.as_slice() {
        [language, path] => (*language, language.to_uppercase(), *path),
        [language, name, path] => (*language, name.to_string(), *path),
        _ => return Err(invalid()),
    };
    if language.is_empty() || path.is_empty() {
        return Err(invalid());
    }
    Ok(CaptionTrack {
        language: language.to_string(),
        name,
        path: PathBuf::from(path),
    })
}

impl FromStr for CaptionTrack {
    type Err = CaptionArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_caption_arg(s)
    }
}
