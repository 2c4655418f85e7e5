//! Access token loading
//!
//! roomsync does not run an OAuth flow. It reads a pre-authorized access
//! token from a JSON token file (the format written by Google's client
//! libraries). Only `access_token` is read; refresh tokens, expiry and scope
//! fields are ignored. The file is read again before every pass (see
//! [`crate::provider::GoogleCalendarProvider`]), so whatever renews it only
//! has to rewrite the file.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenFile {
    #[serde(default)]
    access_token: String,
}

/// Reads the `access_token` field from the JSON token file at `path`
pub fn load_access_token(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read token file {}", path.display()))?;
    let token: TokenFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse token file {}", path.display()))?;

    let access_token = token.access_token.trim().to_string();
    if access_token.is_empty() {
        bail!("Token file {} has no access_token", path.display());
    }
    Ok(access_token)
}
