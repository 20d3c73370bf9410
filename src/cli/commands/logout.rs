use crate::auth::TokenStore;
use crate::config::{CliOverrides, load_settings};
use crate::error::Result;
use crate::output::OutputContext;
use serde_json::json;

/// Execute the logout command. Logging out twice is not an error.
///
/// # Errors
///
/// Returns an error if the token file exists but cannot be removed.
pub fn execute(overrides: &CliOverrides, ctx: &OutputContext) -> Result<()> {
    let settings = load_settings(overrides)?;
    let removed = TokenStore::new(settings.token_path()).delete()?;

    if ctx.is_json() {
        return ctx.json(&json!({ "logged_out": removed }));
    }
    if removed {
        ctx.success("Logged out successfully");
    } else {
        ctx.info("You are not logged in.");
    }
    Ok(())
}
