//! Init command: create a project (or link one) and write its config file.

use super::{connect, project_dir};
use crate::api::SchemaGateway;
use crate::cli::InitArgs;
use crate::config::{CliOverrides, load_settings};
use crate::error::{CliError, Result};
use crate::local::template::{ConfigLanguage, create_config, existing_config};
use crate::output::OutputContext;
use crate::util::slugify;
use serde_json::json;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target<'a> {
    Create { name: &'a str },
    Link { project_id: &'a str },
}

fn target(args: &InitArgs) -> Result<Target<'_>> {
    match (args.project_id.as_deref(), args.name.as_deref()) {
        (Some(project_id), _) => Ok(Target::Link { project_id }),
        (None, Some(name)) if name.trim().is_empty() => {
            Err(CliError::validation("name", "project name is empty"))
        }
        (None, Some(name)) => Ok(Target::Create { name: name.trim() }),
        (None, None) => Err(CliError::validation(
            "init",
            "pass --name <name> to create a project or --project-id <id> to link one",
        )),
    }
}

/// Execute the init command.
///
/// # Errors
///
/// Returns `CliError::AlreadyInitialized` if a config file exists, a
/// validation error for bad arguments, or any API error.
pub fn execute(
    args: &InitArgs,
    dir: Option<&Path>,
    overrides: &CliOverrides,
    ctx: &OutputContext,
) -> Result<()> {
    let dir = project_dir(dir)?;
    if let Some(path) = existing_config(&dir) {
        return Err(CliError::AlreadyInitialized { path });
    }
    let target = target(args)?;

    let settings = load_settings(overrides)?;
    let client = connect(&settings)?;

    let (project, schema) = match target {
        Target::Link { project_id } => {
            let project = client
                .list_projects()?
                .into_iter()
                .find(|project| project.id == project_id)
                .ok_or_else(|| {
                    CliError::validation(
                        "project-id",
                        format!("no project with id {project_id} in your account"),
                    )
                })?;
            let schema = client
                .fetch_schema(project_id)?
                .map(|schema| schema.to_value())
                .transpose()?;
            (project, schema)
        }
        Target::Create { name } => {
            let slug = slugify(name);
            if slug.is_empty() {
                return Err(CliError::validation(
                    "name",
                    "project name needs at least one letter",
                ));
            }
            (client.create_project(name, &slug)?, None)
        }
    };

    let language = if args.js {
        ConfigLanguage::JavaScript
    } else {
        ConfigLanguage::TypeScript
    };
    let name = if project.name.is_empty() {
        project.id.as_str()
    } else {
        project.name.as_str()
    };
    let path = create_config(&dir, language, name, &project.id, schema.as_ref())?;
    info!(project_id = %project.id, file = %path.display(), "Initialized project");

    if ctx.is_json() {
        return ctx.json(&json!({
            "project_id": project.id,
            "name": name,
            "file": path.display().to_string(),
            "linked": matches!(target, Target::Link { .. }),
        }));
    }
    ctx.success(&format!(
        "Project {name} ({}) ready in {}",
        project.id,
        path.display()
    ));
    ctx.hint("basic status");
    Ok(())
}
