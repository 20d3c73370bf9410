//! Version command implementation.

use crate::api::release::{LATEST_RELEASE_URL, current_version, is_update_available, latest_release};
use crate::cli::VersionArgs;
use crate::error::Result;
use crate::output::OutputContext;
use serde::Serialize;
use tracing::warn;

#[derive(Serialize)]
struct VersionOutput {
    version: &'static str,
    build: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    update_available: Option<bool>,
}

/// Execute the version command.
///
/// A failed release check is logged, not returned.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(args: VersionArgs, ctx: &OutputContext) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };

    let latest = if args.check {
        match (current_version(), latest_release(LATEST_RELEASE_URL)) {
            (Ok(current), Ok(latest)) => Some((is_update_available(&current, &latest), latest)),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Could not check for a newer release");
                None
            }
        }
    } else {
        None
    };

    if ctx.is_json() {
        return ctx.json(&VersionOutput {
            version,
            build,
            latest: latest.as_ref().map(|(_, v)| v.to_string()),
            update_available: latest.as_ref().map(|(available, _)| *available),
        });
    }

    // Printed even with --quiet; asking for the version is the whole point.
    println!("basic-cli version {version} ({build})");
    if let Some((true, latest)) = latest {
        println!("New version available: {latest}\n\nPlease update with 'basic update'");
    }
    Ok(())
}
