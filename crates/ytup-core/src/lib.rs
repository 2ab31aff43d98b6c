//! Resumable YouTube video uploads with retry/backoff, plus caption tracks.

pub mod auth;
pub mod captions;
pub mod config;
pub mod http;
pub mod logging;
pub mod metadata;
pub mod progress;
pub mod retry;
pub mod upload;
pub mod youtube;
