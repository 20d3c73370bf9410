//! Browser login through the OAuth authorization-code flow.

use crate::auth::TokenStore;
use crate::auth::oauth::{Callback, OAuthClient, new_state, open_browser, wait_for_callback};
use crate::config::{CliOverrides, load_settings};
use crate::error::{CliError, Result};
use crate::output::OutputContext;
use chrono::Utc;
use serde_json::json;
use std::net::TcpListener;
use tracing::{info, warn};

/// Execute the login command.
///
/// # Errors
///
/// Returns `CliError::Login` if the callback port is taken, the browser
/// flow is denied, or the code exchange fails.
pub fn execute(overrides: &CliOverrides, ctx: &OutputContext) -> Result<()> {
    let settings = load_settings(overrides)?;
    let store = TokenStore::new(settings.token_path());

    let stored = store.load().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable token file");
        None
    });
    if stored.is_some_and(|token| !token.is_expired(Utc::now())) {
        if ctx.is_json() {
            return ctx.json(&json!({"logged_in": true, "already_logged_in": true}));
        }
        ctx.info("Already logged in with a valid token.");
        return Ok(());
    }

    let client = OAuthClient::new(&settings);
    let state = new_state();
    let url = client.authorize_url(&state)?;
    let listener = TcpListener::bind(("127.0.0.1", settings.redirect_port)).map_err(|e| {
        CliError::Login(format!(
            "cannot listen for the callback on port {}: {e}",
            settings.redirect_port
        ))
    })?;

    eprintln!("Open this link in your browser to log in:\n\n  {url}\n");
    open_browser(&url);
    info!(port = settings.redirect_port, "Waiting for login callback");

    let code = match wait_for_callback(&listener, &state)? {
        Callback::Code(code) => code,
        Callback::Denied(reason) => {
            return Err(CliError::Login(format!("authorization was denied: {reason}")));
        }
    };
    let token = client.exchange_code(&code)?;
    store.save(&token)?;

    if ctx.is_json() {
        return ctx.json(&json!({"logged_in": true, "already_logged_in": false}));
    }
    ctx.success("Login successful!");
    Ok(())
}
