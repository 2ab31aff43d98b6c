//! Video resource metadata sent when a resumable upload is started.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `status.privacyStatus` of an uploaded video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    #[default]
    Public,
    Private,
    Unlisted,
}

impl PrivacyStatus {
    pub const ALL: [PrivacyStatus; 3] = [Self::Public, Self::Private, Self::Unlisted];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyStatus::Public => "public",
            PrivacyStatus::Private => "private",
            PrivacyStatus::Unlisted => "unlisted",
        }
    }
}

impl fmt::Display for PrivacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid privacy status '{0}' (expected public, private or unlisted)")]
pub struct ParsePrivacyStatusError(String);

impl FromStr for PrivacyStatus {
    type Err = ParsePrivacyStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrivacyStatus::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParsePrivacyStatusError(s.to_string()))
    }
}

/// Title, description, tags, category and privacy of a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Option<Vec<String>>,
    pub category_id: String,
    pub privacy_status: PrivacyStatus,
}

impl Default for VideoMetadata {
    fn default() -> Self {
        Self {
            title: "Test Title".to_string(),
            description: "Test Description".to_string(),
            tags: None,
            // "People & Blogs"
            category_id: "22".to_string(),
            privacy_status: PrivacyStatus::Public,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet<'a> {
    title: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
    category_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatus {
    privacy_status: PrivacyStatus,
}

#[derive(Serialize)]
struct VideoResource<'a> {
    snippet: VideoSnippet<'a>,
    status: VideoStatus,
}

impl VideoMetadata {
    /// Resource parts this metadata fills (the `part` query parameter).
    pub const PARTS: &'static str = "snippet,status";

    /// Split a comma-separated keyword list into tags. Empty input yields `None`.
    pub fn parse_keywords(keywords: &str) -> Option<Vec<String>> {
        let tags: Vec<String> = keywords
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if tags.is_empty() {
            None
        } else {
            Some(tags)
        }
    }

    /// JSON body for `videos.insert`.
    pub fn to_request_body(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&VideoResource {
            snippet: VideoSnippet {
                title: &self.title,
                description: &self.description,
                tags: self.tags.as_deref(),
                category_id: &self.category_id,
            },
            status: VideoStatus {
                privacy_status: self.privacy_status,
            },
        })
    }
}
