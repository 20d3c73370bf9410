//! Error types and handling for `basic_cli`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration through the `Other` variant
//! - Provides recovery hints for user-facing errors
//! - Every error exits the process with code 1
//! - Provides structured JSON output (`--json` or non-TTY stdout)

mod context;
mod structured;

pub use context::{OptionExt, ResultExt};
pub use structured::{ErrorCode, StructuredError};

use crate::model::ValidationIssue;
use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `basic_cli` operations.
#[derive(Error, Debug)]
pub enum CliError {
    // === Local Schema Errors ===
    /// A config file was found but its schema is missing required fields.
    #[error("Invalid schema in {}: {reason}", file.display())]
    Structural { file: PathBuf, reason: String },

    /// A config file could not be parsed at all.
    #[error("Failed to parse {}: {details}", file.display())]
    ConfigParse { file: PathBuf, details: String },

    /// No local config file holds a schema.
    #[error("No schema found in config files")]
    NoSchema,

    /// The server rejected the schema during validation.
    #[error("schema is invalid: {}", describe_count(errors.len()))]
    SchemaInvalid { errors: Vec<ValidationIssue> },

    /// `init` refused to overwrite an existing config file.
    #[error("{} already exists in this directory", path.display())]
    AlreadyInitialized { path: PathBuf },

    // === Auth Errors ===
    /// No token is stored.
    #[error("you are not logged in. please login with 'basic login'")]
    NotLoggedIn,

    /// A stored token expired and could not be refreshed.
    #[error("token has expired and refresh failed: {0}")]
    TokenRefresh(String),

    /// The OAuth login flow failed.
    #[error("Login failed: {0}")]
    Login(String),

    // === Network Errors ===
    /// The API host is unreachable.
    #[error("you are offline. please check your internet connection.")]
    Offline,

    /// The API answered with a non-2xx status.
    #[error("received non-200 response: {status} - {body}")]
    Remote { status: u16, body: String },

    /// The request never produced a response.
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The project has no schema on the server.
    #[error("No schema found for project {project_id}")]
    RemoteSchemaMissing { project_id: String },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    // === Configuration Errors ===
    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Wrapped errors ===
    /// Error with additional context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Structural { .. }
                | Self::ConfigParse { .. }
                | Self::NoSchema
                | Self::SchemaInvalid { .. }
                | Self::NotLoggedIn
                | Self::TokenRefresh(_)
                | Self::Offline
                | Self::AlreadyInitialized { .. }
                | Self::Validation { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotLoggedIn | Self::TokenRefresh(_) => Some("Run: basic login"),
            Self::NoSchema => Some("Run: basic init"),
            Self::SchemaInvalid { .. } => Some("Fix the errors above, then run: basic status"),
            Self::Offline => {
                Some("Check your internet connection, or point BASIC_API_URL at a reachable server")
            }
            Self::Structural { .. } => {
                Some("The schema needs a project_id, a numeric version and a tables object")
            }
            Self::AlreadyInitialized { .. } => {
                Some("Edit the existing config file, or run init in an empty directory")
            }
            Self::RemoteSchemaMissing { .. } => Some("Publish a schema first with: basic push"),
            _ => None,
        }
    }

    /// Get the exit code for this error.
    ///
    /// Every failure exits with 1.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a structural error for a config file.
    #[must_use]
    pub fn structural(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Structural {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

fn describe_count(count: usize) -> String {
    if count == 1 {
        "1 error".to_string()
    } else {
        format!("{count} errors")
    }
}

/// Result type using `CliError`.
pub type Result<T> = std::result::Result<T, CliError>;
