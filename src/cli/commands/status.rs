//! Status command: report how the local schema relates to the remote one.

use super::{connect, project_dir};
use crate::config::{CliOverrides, load_settings};
use crate::error::Result;
use crate::local::ConfigFileStore;
use crate::model::ValidationIssue;
use crate::output::{OutputContext, StatusPanel};
use crate::sync::{Analysis, SyncContext, SyncStatus, analyze};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct StatusReport<'a> {
    status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_version: Option<u64>,
    remote_exists: bool,
    requires_version_bump: bool,
    messages: &'a [String],
    errors: &'a [ValidationIssue],
    suggested_actions: &'a [&'static str],
}

impl<'a> StatusReport<'a> {
    fn from_analysis(analysis: &'a Analysis) -> Self {
        Self {
            status: analysis.status,
            project_id: analysis.project_id.as_deref(),
            file: analysis
                .local
                .as_ref()
                .map(|local| local.file_path.display().to_string()),
            local_version: analysis.local_version(),
            remote_version: analysis.remote_version(),
            remote_exists: analysis.remote_exists,
            requires_version_bump: analysis.requires_version_bump,
            messages: &analysis.messages,
            errors: &analysis.errors,
            suggested_actions: analysis.suggested_actions(),
        }
    }
}

/// Execute the status command. Never modifies anything.
///
/// # Errors
///
/// Returns an error if not logged in, offline, the config file is
/// malformed, or a remote call fails.
pub fn execute(dir: Option<&Path>, overrides: &CliOverrides, ctx: &OutputContext) -> Result<()> {
    let settings = load_settings(overrides)?;
    let client = connect(&settings)?;
    let dir = project_dir(dir)?;
    let store = ConfigFileStore;

    let analysis = analyze(&SyncContext::new(&store, &client, &dir))?;

    if ctx.is_json() {
        return ctx.json(&StatusReport::from_analysis(&analysis));
    }
    StatusPanel::new(&analysis, ctx.theme()).print(ctx);
    Ok(())
}
