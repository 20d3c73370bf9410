use super::connect;
use crate::config::{CliOverrides, load_settings};
use crate::error::Result;
use crate::output::OutputContext;

/// Execute the account command.
///
/// # Errors
///
/// Returns an error if not logged in, offline, or the request fails.
pub fn execute(overrides: &CliOverrides, ctx: &OutputContext) -> Result<()> {
    let settings = load_settings(overrides)?;
    let user = connect(&settings)?.user_info()?;

    if ctx.is_json() {
        return ctx.json(&user);
    }

    let field = |key: &str| user.get(key).and_then(|v| v.as_str()).unwrap_or("-");
    ctx.print(&format!("Logged in user: {}", field("email")));
    if let Some(name) = user.get("name").and_then(|v| v.as_str()) {
        ctx.print(&format!("Name: {name}"));
    }
    if let Some(id) = user.get("id").and_then(|v| v.as_str()) {
        ctx.print(&format!("ID: {id}"));
    }
    Ok(())
}
