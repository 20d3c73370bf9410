//! Pull command: overwrite the local schema with the published one.

use super::{connect, project_dir, prompt};
use crate::cli::ConfirmArgs;
use crate::config::{CliOverrides, load_settings};
use crate::error::Result;
use crate::local::ConfigFileStore;
use crate::output::OutputContext;
use crate::sync::{PullOrchestrator, PullOutcome, SyncContext, SyncStatus};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct PullReport<'a> {
    pulled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<SyncStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

/// Execute the pull command.
///
/// # Errors
///
/// Returns an error if the remote schema cannot be fetched or the config
/// file cannot be written.
pub fn execute(
    args: ConfirmArgs,
    dir: Option<&Path>,
    overrides: &CliOverrides,
    ctx: &OutputContext,
) -> Result<()> {
    let settings = load_settings(overrides)?;
    let client = connect(&settings)?;
    let dir = project_dir(dir)?;
    let store = ConfigFileStore;

    let flow = PullOrchestrator::new(SyncContext::new(&store, &client, &dir));
    match flow.run(prompt(args.yes).as_mut())? {
        PullOutcome::Pulled(pulled) => {
            if ctx.is_json() {
                return ctx.json(&PullReport {
                    pulled: true,
                    status: None,
                    project_id: Some(&pulled.project_id),
                    previous_version: Some(pulled.previous_version),
                    new_version: Some(pulled.new_version),
                    file: Some(pulled.file_path.display().to_string()),
                    reason: None,
                });
            }
            ctx.success(&format!(
                "Schema pulled: version {} → {} ({})",
                pulled.previous_version,
                pulled.new_version,
                pulled.file_path.display()
            ));
            Ok(())
        }
        PullOutcome::NoAction { reason, analysis } => {
            if ctx.is_json() {
                return ctx.json(&PullReport {
                    pulled: false,
                    status: analysis.as_ref().map(|a| a.status),
                    project_id: analysis.as_ref().and_then(|a| a.project_id.as_deref()),
                    previous_version: None,
                    new_version: None,
                    file: None,
                    reason: Some(&reason),
                });
            }
            ctx.info(&reason);
            Ok(())
        }
    }
}
