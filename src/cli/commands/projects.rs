use super::connect;
use crate::config::{CliOverrides, load_settings};
use crate::error::Result;
use crate::output::{OutputContext, ProjectTable};

/// Execute the projects command.
///
/// # Errors
///
/// Returns an error if not logged in, offline, or the request fails.
pub fn execute(overrides: &CliOverrides, ctx: &OutputContext) -> Result<()> {
    let settings = load_settings(overrides)?;
    let projects = connect(&settings)?.list_projects()?;

    if ctx.is_json() {
        return ctx.json(&projects);
    }
    if projects.is_empty() {
        ctx.info("No projects found.");
        ctx.hint("basic init --name <name>");
        return Ok(());
    }

    let table = ProjectTable::new(&projects, ctx.theme()).title("Your projects");
    if ctx.is_rich() {
        ctx.render(&table.build());
    } else {
        for line in table.plain_lines() {
            ctx.print(&line);
        }
    }
    Ok(())
}
