//! Update command: upgrade the npm-installed CLI.

use crate::api::ApiClient;
use crate::api::release::{
    LATEST_RELEASE_URL, NPM_PACKAGE, current_version, is_update_available, latest_release,
};
use crate::config::{CliOverrides, load_settings};
use crate::error::{CliError, Result};
use crate::output::OutputContext;
use serde_json::json;
use std::process::Command;
use tracing::{debug, info};

/// Execute the update command.
///
/// # Errors
///
/// Returns an error if offline, the release lookup fails, or npm fails.
pub fn execute(overrides: &CliOverrides, ctx: &OutputContext) -> Result<()> {
    let settings = load_settings(overrides)?;
    ApiClient::new(&settings, None).ensure_online()?;

    let current = current_version()?;
    let latest = latest_release(LATEST_RELEASE_URL)?;
    if !is_update_available(&current, &latest) {
        if ctx.is_json() {
            return ctx.json(&json!({"updated": false, "version": current.to_string()}));
        }
        ctx.info("You are already running the latest version!");
        return Ok(());
    }

    info!(%current, %latest, "Updating CLI");
    ctx.info(&format!("Updating {current} → {latest}..."));
    let output = Command::new("npm")
        .args(["update", "-g", NPM_PACKAGE])
        .output()
        .map_err(|e| npm_failed(&e.to_string()))?;
    debug!(status = %output.status, "npm finished");
    if !output.status.success() {
        return Err(npm_failed(String::from_utf8_lossy(&output.stderr).trim()));
    }

    if ctx.is_json() {
        return ctx.json(&json!({
            "updated": true,
            "previous_version": current.to_string(),
            "version": latest.to_string(),
        }));
    }
    ctx.success("Update successful!");
    Ok(())
}

fn npm_failed(reason: &str) -> CliError {
    CliError::Other(anyhow::anyhow!(
        "error updating CLI: {reason}. try running 'npm update -g {NPM_PACKAGE}' or visit https://docs.basic.tech/"
    ))
}
