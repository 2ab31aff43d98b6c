use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::{
    RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRIABLE_STATUS_CODES, MAX_RETRIES_LIMIT,
};
use crate::youtube::DEFAULT_UPLOAD_BASE;

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// HTTP status codes treated as transient.
    pub retriable_status_codes: Vec<u32>,
    /// Length of one backoff unit in seconds; retry `r` sleeps up to `2^r` units.
    pub backoff_unit_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retriable_status_codes: DEFAULT_RETRIABLE_STATUS_CODES.to_vec(),
            backoff_unit_secs: 1.0,
        }
    }
}

impl RetryConfig {
    /// `max_retries` above [`MAX_RETRIES_LIMIT`] is clamped; past that the
    /// backoff cap stops doubling.
    pub fn to_policy(&self) -> RetryPolicy {
        let max_retries = if self.max_retries > MAX_RETRIES_LIMIT {
            tracing::warn!(
                "retry.max_retries = {} exceeds {}; clamping",
                self.max_retries,
                MAX_RETRIES_LIMIT
            );
            MAX_RETRIES_LIMIT
        } else {
            self.max_retries
        };
        RetryPolicy {
            max_retries,
            retriable_status_codes: self.retriable_status_codes.clone(),
            backoff_unit: Duration::try_from_secs_f64(self.backoff_unit_secs.max(0.0))
                .unwrap_or(Duration::from_secs(1)),
            ..RetryPolicy::default()
        }
    }
}

/// Remote endpoints (optional `[api]` section; defaults to the public API).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub upload_base: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            upload_base: DEFAULT_UPLOAD_BASE.to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/ytup/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YtupConfig {
    /// OAuth client secrets downloaded from the API console.
    pub client_secrets_file: PathBuf,
    /// Where the OAuth token is stored. Defaults to `<program>-oauth2.json`.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    /// Resumable upload chunk size in bytes (rounded down to 256 KiB).
    /// Unset sends the whole file in one request.
    #[serde(default)]
    pub chunk_size_bytes: Option<u64>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub api: Option<ApiConfig>,
}

impl Default for YtupConfig {
    fn default() -> Self {
        Self {
            client_secrets_file: PathBuf::from("client_secrets.json"),
            token_file: None,
            chunk_size_bytes: None,
            retry: None,
            api: None,
        }
    }
}

impl YtupConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    pub fn upload_base(&self) -> String {
        self.api.clone().unwrap_or_default().upload_base
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ytup")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<YtupConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

pub fn load_or_init_at(path: &Path) -> Result<YtupConfig> {
    if !path.exists() {
        let default_cfg = YtupConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: YtupConfig = toml::from_str(&data)?;
    Ok(cfg)
}
