//! Tracing setup.
//!
//! Logs always go to stderr so stdout stays clean for command output and
//! `--json` payloads. `RUST_LOG` takes precedence over the verbosity flags.

use anyhow::Result;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Filter directive for the `-v`/`-q` flags.
#[must_use]
pub fn default_filter(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "basic_cli=info,warn",
        2 => "basic_cli=debug,info",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// With `json` set, events are written as JSON lines.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1);

    if json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    } else {
        builder
            .with_ansi(std::io::stderr().is_terminal())
            .without_time()
            .try_init()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    Ok(())
}

/// Route logs through the test harness so they show up only for failures.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("basic_cli=debug"))
        .with_test_writer()
        .try_init();
}
