//! `ytup auth` – authorize once and store the token for later commands.

use anyhow::{Context, Result};
use ytup_core::auth::{SCOPE_FORCE_SSL, SCOPE_UPLOAD};

use super::credentials::{Credentials, TerminalPrompt};

pub fn run_auth(creds: &Credentials) -> Result<()> {
    let auth = creds.authenticator(&[SCOPE_UPLOAD, SCOPE_FORCE_SSL])?;
    auth.authorize(&mut TerminalPrompt)
        .context("authorizing with YouTube")?;
    println!("Credentials stored in {}", auth.storage().path().display());
    Ok(())
}
