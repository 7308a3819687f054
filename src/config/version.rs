//! Version filtering for change sets using semver constraints.
//!
//! A change set written for one generation of the target app can declare a
//! range like ">=1.2.0, <2.0.0"; sets whose range excludes the app's version
//! are skipped wholesale instead of producing a wall of anchor misses.

use semver::{Version, VersionReq};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum VersionError {
    #[error("invalid version '{value}': {reason}")]
    InvalidVersion { value: String, reason: String },

    #[error("invalid version requirement '{value}': {reason}")]
    InvalidRequirement { value: String, reason: String },
}

/// Check if a version matches a requirement string.
///
/// `None` or a blank requirement means "applies to every version".
///
/// # Examples
///
/// ```
/// use patchwright::config::matches_requirement;
///
/// assert!(matches_requirement("1.2.0", Some(">=1.2.0")).unwrap());
/// assert!(!matches_requirement("1.1.0", Some(">=1.2.0")).unwrap());
/// assert!(matches_requirement("0.1.0", None).unwrap());
/// ```
pub fn matches_requirement(
    version: &str,
    requirement: Option<&str>,
) -> Result<bool, VersionError> {
    let requirement = match requirement.map(str::trim) {
        None | Some("") => return Ok(true),
        Some(req) => req,
    };

    let version = Version::parse(version.trim()).map_err(|e| VersionError::InvalidVersion {
        value: version.to_string(),
        reason: e.to_string(),
    })?;

    let req = VersionReq::parse(requirement).map_err(|e| VersionError::InvalidRequirement {
        value: requirement.to_string(),
        reason: e.to_string(),
    })?;

    Ok(req.matches(&version))
}
