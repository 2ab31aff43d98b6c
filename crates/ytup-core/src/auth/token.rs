//! Stored OAuth tokens, persisted as JSON next to the invoking program.

use super::AuthError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Seconds before expiry at which a token is already treated as expired.
const EXPIRY_SKEW_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix time (seconds) at which `access_token` expires.
    #[serde(default)]
    pub expires_at: Option<u64>,
    /// Scopes the token was granted for.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl StoredToken {
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at
            .is_some_and(|t| now.saturating_add(EXPIRY_SKEW_SECS) >= t)
    }

    /// True if every requested scope was granted.
    pub fn covers<S: AsRef<str>>(&self, scopes: &[S]) -> bool {
        scopes
            .iter()
            .all(|s| self.scopes.iter().any(|g| g == s.as_ref()))
    }
}

/// Token file location for a program path: `<program>-oauth2.json`.
pub fn token_path_for_program(program: &Path) -> PathBuf {
    let mut name = program.as_os_str().to_os_string();
    name.push("-oauth2.json");
    PathBuf::from(name)
}

/// Token file keyed by the path this process was invoked as.
pub fn default_token_path() -> PathBuf {
    let program = std::env::args_os()
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("ytup"));
    token_path_for_program(&program)
}

/// Loads and saves a [`StoredToken`] at a fixed path.
#[derive(Debug, Clone)]
pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when there is no token file or it cannot be parsed.
    pub fn load(&self) -> Result<Option<StoredToken>, AuthError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AuthError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        match serde_json::from_str(&data) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "ignoring unreadable token file: {}", e);
                Ok(None)
            }
        }
    }

    pub fn save(&self, token: &StoredToken) -> Result<(), AuthError> {
        let io_err = |source| AuthError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(token)
            .map_err(|e| AuthError::InvalidTokenResponse(e.to_string()))?;
        fs::write(&self.path, json).map_err(io_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(io_err)?;
        }
        tracing::debug!(path = %self.path.display(), "saved oauth token");
        Ok(())
    }
}
