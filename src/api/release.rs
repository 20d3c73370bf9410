//! Release lookups against GitHub.

use crate::error::{CliError, Result};
use semver::Version;
use serde::Deserialize;
use tracing::debug;

/// Latest published release of the CLI.
pub const LATEST_RELEASE_URL: &str =
    "https://api.github.com/repos/basicdb/basic-cli/releases/latest";

/// npm package the CLI is distributed as.
pub const NPM_PACKAGE: &str = "@basictech/cli";

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

/// Version of this build.
///
/// # Errors
///
/// Returns `CliError::Config` if the crate version is not semver.
pub fn current_version() -> Result<Version> {
    parse_tag(env!("CARGO_PKG_VERSION"))
}

/// Parse a release tag such as `v0.4.1`.
///
/// # Errors
///
/// Returns `CliError::Config` if the tag is not a semver version.
pub fn parse_tag(tag: &str) -> Result<Version> {
    let trimmed = tag.trim().trim_start_matches('v');
    Version::parse(trimmed)
        .map_err(|e| CliError::Config(format!("release tag '{tag}' is not a version: {e}")))
}

/// Ask `url` (a GitHub "latest release" endpoint) for the newest version.
///
/// # Errors
///
/// Returns an error if the request fails or the tag is not a version.
pub fn latest_release(url: &str) -> Result<Version> {
    let response = ureq::get(url)
        .set("Accept", "application/vnd.github+json")
        .set("User-Agent", concat!("basic-cli/", env!("CARGO_PKG_VERSION")))
        .call()
        .map_err(|e| match e {
            ureq::Error::Status(status, response) => CliError::Remote {
                status,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => CliError::Transport {
                url: url.to_string(),
                reason: transport.to_string(),
            },
        })?;
    let release: Release = response.into_json()?;
    debug!(tag = %release.tag_name, "Latest release");
    parse_tag(&release.tag_name)
}

/// Whether `latest` is strictly newer than `current`.
#[must_use]
pub fn is_update_available(current: &Version, latest: &Version) -> bool {
    latest > current
}
