//! Command implementations, one module per subcommand.

pub mod account;
pub mod completions;
pub mod debug;
pub mod init;
pub mod login;
pub mod logout;
pub mod projects;
pub mod pull;
pub mod push;
pub mod status;
pub mod update;
pub mod version;

use crate::api::ApiClient;
use crate::auth::oauth::OAuthClient;
use crate::auth::{TokenProvider, TokenStore};
use crate::config::Settings;
use crate::error::Result;
use crate::util::{AutoConfirm, Prompt, TerminalPrompt};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Client for a logged-in user, after checking the API is reachable.
///
/// # Errors
///
/// Returns `CliError::NotLoggedIn` without a stored token, a refresh error
/// if an expired token cannot be renewed, or `CliError::Offline`.
pub(crate) fn connect(settings: &Settings) -> Result<ApiClient> {
    let store = TokenStore::new(settings.token_path());
    let oauth = OAuthClient::new(settings);
    let token = TokenProvider::new(&store, &oauth).require()?;
    let client = ApiClient::new(settings, Some(&token));
    client.ensure_online()?;
    debug!(api = %settings.api_url, "Connected");
    Ok(client)
}

/// The directory holding the project's config file.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub(crate) fn project_dir(dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Ok(std::env::current_dir()?),
    }
}

pub(crate) fn prompt(yes: bool) -> Box<dyn Prompt> {
    if yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(TerminalPrompt)
    }
}
