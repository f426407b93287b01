//! Issuer profile configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use remessa_format::IssuerProfile;

/// Load the issuer profile from a JSON file, or the built-in defaults when no file is given.
///
/// Keys left out of the file keep their default value; unknown keys are rejected.
pub fn load_profile(path: Option<&Path>) -> Result<IssuerProfile> {
    let Some(path) = path else {
        return Ok(IssuerProfile::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let profile: IssuerProfile = serde_json::from_str(&text)
        .with_context(|| format!("parse config {}", path.display()))?;
    profile
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded issuer profile");
    Ok(profile)
}
