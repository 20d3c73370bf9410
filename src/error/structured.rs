//! Structured error output for scripts and CI.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

use crate::error::CliError;
use crate::model::ValidationIssue;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
/// Format: `SCREAMING_SNAKE_CASE` for easy parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Local Schema Errors ===
    /// Schema is missing required fields
    SchemaStructure,
    /// Server rejected the schema
    SchemaInvalid,
    /// Config file could not be parsed
    ConfigParseError,
    /// No local schema
    NoSchema,
    /// A config file already exists
    AlreadyInitialized,

    // === Auth Errors ===
    /// No stored token
    NotLoggedIn,
    /// Stored token expired and refresh failed
    TokenExpired,
    /// Login flow failed
    LoginFailed,

    // === Network Errors ===
    /// API host unreachable
    Offline,
    /// Non-2xx API response
    RemoteError,
    /// Request failed before a response arrived
    TransportError,
    /// Project has no published schema
    RemoteSchemaMissing,

    // === Validation Errors ===
    /// Field validation failed
    ValidationFailed,

    // === Config Errors ===
    /// Configuration error
    ConfigError,

    // === I/O Errors ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,
    /// YAML parsing error
    YamlError,

    // === Internal Errors ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SchemaStructure => "SCHEMA_STRUCTURE",
            Self::SchemaInvalid => "SCHEMA_INVALID",
            Self::ConfigParseError => "CONFIG_PARSE_ERROR",
            Self::NoSchema => "NO_SCHEMA",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::NotLoggedIn => "NOT_LOGGED_IN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::LoginFailed => "LOGIN_FAILED",
            Self::Offline => "OFFLINE",
            Self::RemoteError => "REMOTE_ERROR",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::RemoteSchemaMissing => "REMOTE_SCHEMA_MISSING",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether the same command might succeed when simply run again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Offline | Self::TransportError | Self::RemoteError | Self::LoginFailed
        )
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `CliError`.
    #[must_use]
    pub fn from_error(err: &CliError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = Self::generate_hint(err);

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Error for a schema the server refused to accept.
    #[must_use]
    pub fn schema_invalid(errors: &[ValidationIssue]) -> Self {
        Self::from_error(&CliError::SchemaInvalid {
            errors: errors.to_vec(),
        })
    }

    /// Convert to JSON value for output.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable terminal output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &CliError) -> (ErrorCode, Option<Value>) {
        match err {
            CliError::Structural { file, reason } => (
                ErrorCode::SchemaStructure,
                Some(json!({"file": file.display().to_string(), "reason": reason})),
            ),
            CliError::ConfigParse { file, .. } => (
                ErrorCode::ConfigParseError,
                Some(json!({"file": file.display().to_string()})),
            ),
            CliError::NoSchema => (ErrorCode::NoSchema, None),
            CliError::SchemaInvalid { errors } => {
                (ErrorCode::SchemaInvalid, Some(json!({ "errors": errors })))
            }
            CliError::AlreadyInitialized { path } => (
                ErrorCode::AlreadyInitialized,
                Some(json!({"path": path.display().to_string()})),
            ),
            CliError::NotLoggedIn => (ErrorCode::NotLoggedIn, None),
            CliError::TokenRefresh(_) => (ErrorCode::TokenExpired, None),
            CliError::Login(_) => (ErrorCode::LoginFailed, None),
            CliError::Offline => (ErrorCode::Offline, None),
            CliError::Remote { status, .. } => {
                (ErrorCode::RemoteError, Some(json!({"status": status})))
            }
            CliError::Transport { url, .. } => {
                (ErrorCode::TransportError, Some(json!({"url": url})))
            }
            CliError::RemoteSchemaMissing { project_id } => (
                ErrorCode::RemoteSchemaMissing,
                Some(json!({"project_id": project_id})),
            ),
            CliError::Validation { field, reason } => (
                ErrorCode::ValidationFailed,
                Some(json!({"field": field, "reason": reason})),
            ),
            CliError::Config(_) => (ErrorCode::ConfigError, None),
            CliError::Io(_) => (ErrorCode::IoError, None),
            CliError::Json(_) => (ErrorCode::JsonError, None),
            CliError::Yaml(_) => (ErrorCode::YamlError, None),
            CliError::WithContext { source, .. } => source
                .downcast_ref::<CliError>()
                .map_or((ErrorCode::InternalError, None), Self::extract_code_and_context),
            CliError::Other(_) => (ErrorCode::InternalError, None),
        }
    }

    fn generate_hint(err: &CliError) -> Option<String> {
        if let Some(suggestion) = err.suggestion() {
            return Some(suggestion.to_string());
        }

        match err {
            CliError::Remote { status: 401 | 403, .. } => {
                Some("Your session may have expired. Run: basic login".to_string())
            }
            CliError::ConfigParse { file, .. } => Some(format!(
                "Fix the syntax error in {} and try again",
                file.display()
            )),
            _ => None,
        }
    }
}
