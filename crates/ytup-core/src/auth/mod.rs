//! OAuth 2.0 credentials for the YouTube Data API.
//!
//! Reuses a stored token while it is valid, refreshes it when it has
//! expired, and otherwise runs the installed-app authorization-code flow.
//! The code comes back through a one-shot loopback listener, or the user
//! pastes it when no listener can be used.

mod loopback;
mod secrets;
mod token;

pub use loopback::LoopbackReceiver;
pub use secrets::ClientSecrets;
pub use token::{default_token_path, token_path_for_program, StoredToken, TokenStorage};

use oauth2::basic::{BasicClient, BasicErrorResponse, BasicTokenResponse};
use oauth2::curl::http_client;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl,
    RefreshToken, RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Upload videos.
pub const SCOPE_UPLOAD: &str = "https://www.googleapis.com/auth/youtube.upload";
/// Manage captions (and everything else on the channel).
pub const SCOPE_FORCE_SSL: &str = "https://www.googleapis.com/auth/youtube.force-ssl";

/// How long the loopback listener waits for the browser to come back.
pub const DEFAULT_REDIRECT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(
        "please configure OAuth 2.0: client secrets file not found at {} \
         (download it from https://console.cloud.google.com/)",
        .0.display()
    )]
    MissingClientSecrets(PathBuf),
    #[error("invalid client secrets: {0}")]
    InvalidSecrets(String),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("reading authorization code: {0}")]
    Prompt(#[source] io::Error),
    #[error("loopback redirect listener: {0}")]
    Loopback(#[source] io::Error),
    #[error("timed out waiting for the authorization redirect")]
    RedirectTimeout,
    #[error("no authorization code provided")]
    NoCode,
    #[error("authorization denied: {0}")]
    Denied(String),
    #[error("authorization response does not belong to this request (state mismatch)")]
    StateMismatch,
    #[error("token request failed: {0}")]
    TokenRequest(#[source] oauth2::curl::Error),
    #[error("token endpoint rejected the request: {0}")]
    Rejected(String),
    #[error("invalid token response: {0}")]
    InvalidTokenResponse(String),
}

type TokenRequestError = RequestTokenError<oauth2::curl::Error, BasicErrorResponse>;

impl From<TokenRequestError> for AuthError {
    fn from(e: TokenRequestError) -> Self {
        match e {
            RequestTokenError::ServerResponse(resp) => AuthError::Rejected(resp.to_string()),
            RequestTokenError::Request(err) => AuthError::TokenRequest(err),
            RequestTokenError::Parse(err, body) => AuthError::InvalidTokenResponse(format!(
                "{}: {}",
                err,
                String::from_utf8_lossy(&body)
            )),
            RequestTokenError::Other(msg) => AuthError::InvalidTokenResponse(msg),
        }
    }
}

/// How the authorization code gets back from the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectMode {
    /// Redirect to `127.0.0.1:<free port>` and capture it.
    #[default]
    Loopback,
    /// Redirect to the client's configured URI; the user pastes the code.
    Manual,
}

/// User interaction during the authorization-code flow.
pub trait ConsentPrompt {
    /// Present the consent URL. `listening` is true when the redirect will be
    /// captured without further input.
    fn show_url(&mut self, url: &str, listening: bool) -> io::Result<()>;

    /// What the user pasted: the bare code or the whole redirect URL.
    fn read_code(&mut self) -> io::Result<String>;
}

/// Fields of a token response that get persisted.
#[derive(Debug)]
struct IssuedToken {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

impl From<BasicTokenResponse> for IssuedToken {
    fn from(resp: BasicTokenResponse) -> Self {
        Self {
            access_token: resp.access_token().secret().clone(),
            refresh_token: resp.refresh_token().map(|t| t.secret().clone()),
            expires_in: resp.expires_in().map(|d| d.as_secs()),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Produces access tokens for a fixed set of scopes.
#[derive(Debug, Clone)]
pub struct Authenticator {
    secrets: ClientSecrets,
    storage: TokenStorage,
    scopes: Vec<String>,
    redirect: RedirectMode,
    redirect_timeout: Duration,
}

impl Authenticator {
    pub fn new(secrets: ClientSecrets, storage: TokenStorage, scopes: &[&str]) -> Self {
        Self {
            secrets,
            storage,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            redirect: RedirectMode::default(),
            redirect_timeout: DEFAULT_REDIRECT_TIMEOUT,
        }
    }

    pub fn with_redirect_mode(mut self, mode: RedirectMode) -> Self {
        self.redirect = mode;
        self
    }

    pub fn with_redirect_timeout(mut self, timeout: Duration) -> Self {
        self.redirect_timeout = timeout;
        self
    }

    pub fn storage(&self) -> &TokenStorage {
        &self.storage
    }

    fn client(&self, redirect_uri: &str) -> Result<BasicClient, AuthError> {
        let invalid = |e: oauth2::url::ParseError| AuthError::InvalidSecrets(e.to_string());
        Ok(BasicClient::new(
            ClientId::new(self.secrets.client_id.clone()),
            Some(ClientSecret::new(self.secrets.client_secret.clone())),
            AuthUrl::new(self.secrets.auth_uri.clone()).map_err(invalid)?,
            Some(TokenUrl::new(self.secrets.token_uri.clone()).map_err(invalid)?),
        )
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(RedirectUrl::new(redirect_uri.to_string()).map_err(invalid)?))
    }

    /// Consent URL redirecting to `redirect_uri`, and the state it carries.
    pub fn authorization_url(&self, redirect_uri: &str) -> Result<(String, CsrfToken), AuthError> {
        let (url, state) = self
            .client(redirect_uri)?
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .url();
        Ok((url.to_string(), state))
    }

    /// A valid access token: stored, refreshed, or freshly authorized.
    ///
    /// `prompt` is used only when the user has to grant access.
    pub fn access_token(&self, prompt: &mut dyn ConsentPrompt) -> Result<String, AuthError> {
        let now = unix_now();
        if let Some(stored) = self.storage.load()? {
            if !stored.covers(&self.scopes) {
                tracing::info!("stored token lacks requested scopes; re-authorizing");
            } else if !stored.is_expired(now) {
                tracing::debug!("using stored access token");
                return Ok(stored.access_token);
            } else if let Some(refresh_token) = stored.refresh_token.as_deref() {
                match self.refresh(refresh_token, now) {
                    Ok(token) => {
                        self.storage.save(&token)?;
                        tracing::info!("refreshed access token");
                        return Ok(token.access_token);
                    }
                    Err(e) => tracing::warn!("token refresh failed, re-authorizing: {}", e),
                }
            }
        }
        let token = self.authorize(prompt)?;
        Ok(token.access_token)
    }

    /// Runs the authorization-code flow unconditionally and stores the result.
    pub fn authorize(&self, prompt: &mut dyn ConsentPrompt) -> Result<StoredToken, AuthError> {
        let (code, redirect_uri) = match self.redirect {
            RedirectMode::Loopback => match LoopbackReceiver::bind() {
                Ok(receiver) => self.code_via_loopback(&receiver, prompt)?,
                Err(e) => {
                    tracing::warn!("cannot listen for the redirect, asking for the code: {}", e);
                    self.code_via_paste(prompt)?
                }
            },
            RedirectMode::Manual => self.code_via_paste(prompt)?,
        };

        let resp = self
            .client(&redirect_uri)?
            .exchange_code(AuthorizationCode::new(code))
            .request(http_client)?;
        let token = self.stored_from(resp.into(), None, unix_now());
        self.storage.save(&token)?;
        tracing::info!(path = %self.storage.path().display(), "stored new oauth token");
        Ok(token)
    }

    /// Returns the code and the redirect URI it was issued for.
    fn code_via_loopback(
        &self,
        receiver: &LoopbackReceiver,
        prompt: &mut dyn ConsentPrompt,
    ) -> Result<(String, String), AuthError> {
        let redirect_uri = receiver.redirect_uri().map_err(AuthError::Loopback)?;
        let (url, state) = self.authorization_url(&redirect_uri)?;
        prompt.show_url(&url, true).map_err(AuthError::Prompt)?;
        let target = receiver.wait_for_redirect(self.redirect_timeout)?;
        let redirected = format!("{}{}", redirect_uri.trim_end_matches('/'), target);
        let code = extract_code(&redirected, Some(state.secret()))?;
        Ok((code, redirect_uri))
    }

    fn code_via_paste(&self, prompt: &mut dyn ConsentPrompt) -> Result<(String, String), AuthError> {
        let redirect_uri = self.secrets.redirect_uri().to_string();
        let (url, state) = self.authorization_url(&redirect_uri)?;
        prompt.show_url(&url, false).map_err(AuthError::Prompt)?;
        let input = prompt.read_code().map_err(AuthError::Prompt)?;
        let code = extract_code(&input, Some(state.secret()))?;
        Ok((code, redirect_uri))
    }

    fn refresh(&self, refresh_token: &str, now: u64) -> Result<StoredToken, AuthError> {
        let resp = self
            .client(self.secrets.redirect_uri())?
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request(http_client)?;
        Ok(self.stored_from(resp.into(), Some(refresh_token), now))
    }

    fn stored_from(&self, issued: IssuedToken, previous_refresh: Option<&str>, now: u64) -> StoredToken {
        StoredToken {
            access_token: issued.access_token,
            // Refresh responses usually omit the refresh token; keep the old one.
            refresh_token: issued
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
            expires_at: issued.expires_in.map(|secs| now.saturating_add(secs)),
            scopes: self.scopes.clone(),
        }
    }
}

/// Pull the authorization code out of a bare code or a redirect URL
/// (`...?code=...` or `...?error=...`). A `state` in the URL must match
/// `expected_state` when one is given.
pub fn extract_code(input: &str, expected_state: Option<&str>) -> Result<String, AuthError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AuthError::NoCode);
    }
    if let Ok(u) = url::Url::parse(input) {
        if u.scheme() == "http" || u.scheme() == "https" {
            let mut code = None;
            let mut state = None;
            for (k, v) in u.query_pairs() {
                match k.as_ref() {
                    "code" => code = Some(v.into_owned()),
                    "state" => state = Some(v.into_owned()),
                    "error" => return Err(AuthError::Denied(v.into_owned())),
                    _ => {}
                }
            }
            if let (Some(got), Some(want)) = (state.as_deref(), expected_state) {
                if got != want {
                    return Err(AuthError::StateMismatch);
                }
            }
            return code.ok_or(AuthError::NoCode);
        }
    }
    Ok(input.to_string())
}
