use crate::config::{CliOverrides, load_settings};
use crate::error::Result;
use crate::output::OutputContext;
use serde_json::json;

/// Execute the debug command: show where the CLI keeps its state.
///
/// # Errors
///
/// Returns an error if the settings cannot be resolved.
pub fn execute(overrides: &CliOverrides, ctx: &OutputContext) -> Result<()> {
    let settings = load_settings(overrides)?;
    let token_path = settings.token_path();

    if ctx.is_json() {
        return ctx.json(&json!({
            "config_dir": settings.config_dir.display().to_string(),
            "token_file": token_path.display().to_string(),
            "token_present": token_path.is_file(),
            "user_config": settings.user_config_path().display().to_string(),
            "api_url": settings.api_url,
            "auth_url": settings.auth_url,
            "token_url": settings.token_url,
            "redirect_uri": settings.redirect_uri(),
        }));
    }

    ctx.print(&format!(
        "Basic CLI config directory: {}",
        settings.config_dir.display()
    ));
    ctx.print(&format!(
        "Token file: {}{}",
        token_path.display(),
        if token_path.is_file() { "" } else { " (not logged in)" }
    ));
    ctx.print(&format!("API: {}", settings.api_url));
    Ok(())
}
