//! OAuth client secrets (`client_secrets.json` from the API console).

use super::AuthError;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_REDIRECT_URI: &str = "http://localhost";

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The `installed` (or `web`) section of a client secrets file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Parse a client secrets document; `installed` wins over `web`.
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let file: SecretsFile =
            serde_json::from_str(json).map_err(|e| AuthError::InvalidSecrets(e.to_string()))?;
        file.installed.or(file.web).ok_or_else(|| {
            AuthError::InvalidSecrets("neither an \"installed\" nor a \"web\" section".to_string())
        })
    }

    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::MissingClientSecrets(path.to_path_buf()));
            }
            Err(e) => {
                return Err(AuthError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        Self::from_json(&data)
    }

    /// Redirect URI used for the authorization-code flow.
    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_REDIRECT_URI)
    }
}
