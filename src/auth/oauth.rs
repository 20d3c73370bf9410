//! Browser login with the OAuth authorization-code flow.
//!
//! The CLI prints (and tries to open) the authorize URL, then waits on a
//! one-shot loopback listener for the provider to redirect back to
//! `http://localhost:<port>/callback` with a code.

use super::TokenRefresher;
use crate::config::Settings;
use crate::error::{CliError, Result};
use crate::model::Token;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use rand::RngCore;
use serde::Deserialize;
use std::io::{self, BufRead, BufReader, ErrorKind, Write};
use std::net::{TcpListener, TcpStream};
use std::process::Command;
use tracing::{debug, warn};
use url::Url;

/// How long one callback connection may stay silent before it is dropped.
/// Browsers open speculative connections that never send a request.
const CALLBACK_READ_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(2);

/// Lifetime assumed when the token response omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

const SUCCESS_PAGE: &str = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Basic CLI</title></head>\
<body style=\"font-family: sans-serif; text-align: center; margin-top: 20vh\">\
<h1>Login successful</h1><p>You can close this window and return to your terminal.</p></body></html>";

/// Random, URL-safe `state` value binding the callback to this login.
#[must_use]
pub fn new_state() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Token endpoint response. The refresh token arrives as `refresh`, or
/// `refresh_token` from standard providers.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    fn into_token(self) -> Option<Token> {
        let refresh_token = self.refresh.or(self.refresh_token)?;
        let expires_in = self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        Some(Token {
            access_token: self.access_token,
            refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at: Utc::now() + Duration::seconds(expires_in),
        })
    }
}

/// Talks to the authorize and token endpoints.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    auth_url: String,
    token_url: String,
    client_id: String,
    redirect_uri: String,
    agent: ureq::Agent,
}

impl OAuthClient {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            auth_url: settings.auth_url.clone(),
            token_url: settings.token_url.clone(),
            client_id: settings.client_id.clone(),
            redirect_uri: settings.redirect_uri(),
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    /// URL the user visits to grant access.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` if the configured auth URL is invalid.
    pub fn authorize_url(&self, state: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("state", state),
            ],
        )
        .map_err(|e| CliError::Config(format!("invalid auth url '{}': {e}", self.auth_url)))?;
        Ok(url.into())
    }

    /// Trade a code (or, for refresh, the refresh token) for a token.
    fn exchange(&self, code: &str) -> std::result::Result<Token, String> {
        debug!(url = %self.token_url, "Exchanging code for token");
        let response = self
            .agent
            .post(&self.token_url)
            .send_form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", &self.redirect_uri),
                ("client_id", &self.client_id),
            ])
            .map_err(|e| match e {
                ureq::Error::Status(status, response) => {
                    let body = response.into_string().unwrap_or_default();
                    format!("token endpoint answered {status}: {body}")
                }
                ureq::Error::Transport(transport) => transport.to_string(),
            })?;

        let parsed: TokenResponse = response
            .into_json()
            .map_err(|e| format!("malformed token response: {e}"))?;
        parsed
            .into_token()
            .ok_or_else(|| "token response has no refresh token".to_string())
    }

    /// Exchange an authorization code from the callback.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Login` if the token endpoint refuses the code.
    pub fn exchange_code(&self, code: &str) -> Result<Token> {
        self.exchange(code).map_err(CliError::Login)
    }
}

impl TokenRefresher for OAuthClient {
    fn refresh(&self, token: &Token) -> Result<Token> {
        self.exchange(&token.refresh_token)
            .map_err(CliError::TokenRefresh)
    }
}

/// What the loopback listener got back from the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Code(String),
    Denied(String),
}

/// Serve requests on `listener` until one hits `/callback`.
///
/// Requests for other paths (favicon probes and the like) get a 404 and
/// are skipped.
///
/// # Errors
///
/// Returns `CliError::Login` on a state mismatch or a callback without a
/// code, and an I/O error if the listener fails.
pub fn wait_for_callback(listener: &TcpListener, expected_state: &str) -> Result<Callback> {
    loop {
        let (stream, peer) = listener.accept()?;
        debug!(%peer, "Callback connection");
        if let Some(outcome) = handle_connection(stream, expected_state)? {
            return outcome;
        }
    }
}

fn handle_connection(
    mut stream: TcpStream,
    expected_state: &str,
) -> Result<Option<Result<Callback>>> {
    stream.set_read_timeout(Some(CALLBACK_READ_TIMEOUT))?;
    let request_line = match read_request(&stream) {
        Ok(line) if line.trim().is_empty() => {
            debug!("Callback connection closed without a request");
            return Ok(None);
        }
        Ok(line) => line,
        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
            debug!("Dropping idle callback connection");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let Ok(url) = Url::parse(&format!("http://localhost{target}")) else {
        respond(&mut stream, "400 Bad Request", "Malformed request")?;
        return Ok(None);
    };
    if url.path() != "/callback" {
        respond(&mut stream, "404 Not Found", "Not found")?;
        return Ok(None);
    }

    let query = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if query("state").as_deref() != Some(expected_state) {
        respond(&mut stream, "400 Bad Request", "Invalid state")?;
        return Ok(Some(Err(CliError::Login(
            "callback state did not match; try logging in again".to_string(),
        ))));
    }

    if let Some(error) = query("error") {
        respond(&mut stream, "400 Bad Request", "Login was not completed")?;
        return Ok(Some(Ok(Callback::Denied(error))));
    }

    let Some(code) = query("code").filter(|code| !code.is_empty()) else {
        respond(&mut stream, "400 Bad Request", "Code not found")?;
        return Ok(Some(Err(CliError::Login(
            "callback carried no authorization code".to_string(),
        ))));
    };

    respond_html(&mut stream, SUCCESS_PAGE)?;
    Ok(Some(Ok(Callback::Code(code))))
}

/// Read the request line and drain the headers.
fn read_request(stream: &TcpStream) -> io::Result<String> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    let mut header = String::new();
    loop {
        header.clear();
        if reader.read_line(&mut header)? == 0 || header == "\r\n" || header == "\n" {
            break;
        }
    }
    Ok(request_line)
}

fn respond(stream: &mut TcpStream, status: &str, body: &str) -> Result<()> {
    write!(
        stream,
        "HTTP/1.1 {status}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )?;
    stream.flush()?;
    Ok(())
}

fn respond_html(stream: &mut TcpStream, body: &str) -> Result<()> {
    write!(
        stream,
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )?;
    stream.flush()?;
    Ok(())
}

/// Best-effort launch of the system browser.
pub fn open_browser(url: &str) -> bool {
    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("rundll32")
            .args(["url.dll,FileProtocolHandler", url])
            .spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };
    match result {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "Could not open a browser");
            false
        }
    }
}
