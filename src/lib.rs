//! `basic_cli`: the library behind the `basic` command.
//!
//! The interesting part is [`sync`], which classifies a local schema
//! against the server's copy and drives confirmable push and pull flows.
//! The rest is plumbing around it: the config file store ([`local`]), the
//! HTTP gateway ([`api`]), stored credentials ([`auth`]) and the CLI.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod local;
pub mod logging;
pub mod model;
pub mod output;
pub mod sync;
pub mod util;

pub use error::{CliError, ErrorCode, Result, StructuredError};
