//! Push command: publish the local schema after confirmation.

use super::{connect, project_dir, prompt};
use crate::cli::ConfirmArgs;
use crate::config::{CliOverrides, load_settings};
use crate::error::{CliError, Result};
use crate::local::ConfigFileStore;
use crate::output::{OutputContext, StatusPanel};
use crate::sync::{PushOrchestrator, PushOutcome, SyncContext, SyncStatus};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct PushReport<'a> {
    pushed: bool,
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

/// Execute the push command.
///
/// # Errors
///
/// Returns an error if the push fails, or `CliError::SchemaInvalid` when
/// the server rejects the schema during validation.
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

    let flow = PushOrchestrator::new(SyncContext::new(&store, &client, &dir));
    let outcome = flow.run(prompt(args.yes).as_mut())?;

    match outcome {
        PushOutcome::Pushed(pushed) => {
            if ctx.is_json() {
                return ctx.json(&PushReport {
                    pushed: true,
                    status: None,
                    project_id: Some(&pushed.project_id),
                    previous_version: Some(pushed.previous_version),
                    new_version: Some(pushed.new_version),
                    file: Some(pushed.file_path.display().to_string()),
                    reason: None,
                });
            }
            ctx.success(&format!(
                "Schema pushed: version {} → {} ({})",
                pushed.previous_version,
                pushed.new_version,
                pushed.file_path.display()
            ));
            Ok(())
        }
        PushOutcome::NoAction { reason, analysis } => {
            if let Some(invalid) = analysis
                .as_ref()
                .filter(|a| a.status == SyncStatus::Invalid)
            {
                if !ctx.is_json() {
                    StatusPanel::new(invalid, ctx.theme()).print(ctx);
                }
                return Err(CliError::SchemaInvalid {
                    errors: invalid.errors.clone(),
                });
            }
            if ctx.is_json() {
                return ctx.json(&PushReport {
                    pushed: false,
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
