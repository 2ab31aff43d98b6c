//! Client secrets and token locations, plus the terminal consent prompt.

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use ytup_core::auth::{
    default_token_path, Authenticator, ClientSecrets, ConsentPrompt, RedirectMode, TokenStorage,
};
use ytup_core::config::YtupConfig;

/// Where OAuth material lives for this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_secrets: PathBuf,
    pub token_file: PathBuf,
    pub redirect: RedirectMode,
}

impl Credentials {
    /// Command-line flags win over config; the token file falls back to
    /// `<program>-oauth2.json`.
    pub fn resolve(
        client_secrets: Option<PathBuf>,
        token_file: Option<PathBuf>,
        noauth_local_webserver: bool,
        cfg: &YtupConfig,
    ) -> Self {
        Self {
            client_secrets: client_secrets.unwrap_or_else(|| cfg.client_secrets_file.clone()),
            token_file: token_file
                .or_else(|| cfg.token_file.clone())
                .unwrap_or_else(default_token_path),
            redirect: if noauth_local_webserver {
                RedirectMode::Manual
            } else {
                RedirectMode::Loopback
            },
        }
    }

    pub fn authenticator(&self, scopes: &[&str]) -> Result<Authenticator> {
        let secrets = ClientSecrets::load(&self.client_secrets)?;
        Ok(Authenticator::new(
            secrets,
            TokenStorage::new(self.token_file.clone()),
            scopes,
        )
        .with_redirect_mode(self.redirect))
    }

    /// Access token for `scopes`, prompting on the terminal if needed.
    pub fn access_token(&self, scopes: &[&str]) -> Result<String> {
        self.authenticator(scopes)?
            .access_token(&mut TerminalPrompt)
            .context("authenticating with YouTube")
    }
}

/// Consent prompt on stdout/stdin.
pub struct TerminalPrompt;

impl ConsentPrompt for TerminalPrompt {
    fn show_url(&mut self, url: &str, listening: bool) -> io::Result<()> {
        println!("Go to the following link in your browser:");
        println!();
        println!("    {}", url);
        println!();
        if listening {
            println!("Waiting for the authorization redirect...");
            println!("(Run with --noauth-local-webserver to paste the code instead.)");
        }
        Ok(())
    }

    fn read_code(&mut self) -> io::Result<String> {
        print!("Enter verification code (or the full redirect URL): ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cfg = YtupConfig {
            token_file: Some(PathBuf::from("/cfg/token.json")),
            ..YtupConfig::default()
        };
        let creds = Credentials::resolve(
            Some(PathBuf::from("/flag/secrets.json")),
            Some(PathBuf::from("/flag/token.json")),
            true,
            &cfg,
        );
        assert_eq!(creds.client_secrets, PathBuf::from("/flag/secrets.json"));
        assert_eq!(creds.token_file, PathBuf::from("/flag/token.json"));
        assert_eq!(creds.redirect, RedirectMode::Manual);
    }

    #[test]
    fn config_then_program_default() {
        let cfg = YtupConfig {
            token_file: Some(PathBuf::from("/cfg/token.json")),
            ..YtupConfig::default()
        };
        let creds = Credentials::resolve(None, None, false, &cfg);
        assert_eq!(creds.client_secrets, PathBuf::from("client_secrets.json"));
        assert_eq!(creds.token_file, PathBuf::from("/cfg/token.json"));
        assert_eq!(creds.redirect, RedirectMode::Loopback);

        let creds = Credentials::resolve(None, None, false, &YtupConfig::default());
        assert!(creds
            .token_file
            .to_string_lossy()
            .ends_with("-oauth2.json"));
    }

    #[test]
    fn missing_secrets_file_mentions_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let creds = Credentials {
            client_secrets: dir.path().join("client_secrets.json"),
            token_file: dir.path().join("tok.json"),
            redirect: RedirectMode::Manual,
        };
        let err = creds.authenticator(&["scope"]).unwrap_err();
        assert!(format!("{:#}", err).contains("please configure OAuth 2.0"));
    }
}
