//! Core data types for `basic_cli`.
//!
//! This module defines the fundamental types used throughout the application:
//! - `Schema` - A project's database schema (local or remote)
//! - `TableSchema` / `FieldSchema` - The pieces of a schema
//! - `Token` - Stored OAuth credentials
//! - `Project` - A project as listed by the API
//! - `ValidationIssue` - One problem reported by schema validation

use crate::error::{CliError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Kind of a table in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    #[default]
    Collection,
    Document,
    #[serde(untagged)]
    Custom(String),
}

impl TableKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Collection => "collection",
            Self::Document => "document",
            Self::Custom(value) => value,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One field of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    /// `Some(Value::Null)` for an explicit `default: null`.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,

    /// Keys this tool does not interpret, kept so they survive a round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A key that is present is `Some`, even when its value is `null`.
fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// One table of a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(rename = "type", default)]
    pub kind: TableKind,

    #[serde(default)]
    pub fields: BTreeMap<String, FieldSchema>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A project's schema.
///
/// `version` is the only ordering signal between a local and a remote copy.
/// Equal versions say nothing about equal content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub project_id: String,

    #[serde(default)]
    pub version: u64,

    #[serde(default)]
    pub tables: BTreeMap<String, TableSchema>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Schema {
    /// Placeholder used when the server has no schema for a project yet.
    #[must_use]
    pub fn empty(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            version: 0,
            tables: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    /// Build a schema from a raw JSON value read out of `source`.
    ///
    /// The required keys are checked on the raw value first so the error
    /// names the missing piece instead of a serde message.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Structural` when `project_id` is missing or empty,
    /// `version` is missing or not a non-negative integer, or `tables` is
    /// missing or not an object.
    pub fn from_local_value(value: Value, source: &Path) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(CliError::structural(source, "schema must be an object"));
        };

        match object.get("project_id") {
            Some(Value::String(id)) if !id.trim().is_empty() => {}
            Some(Value::String(_)) => {
                return Err(CliError::structural(source, "project_id is empty"));
            }
            Some(_) => return Err(CliError::structural(source, "project_id must be a string")),
            None => return Err(CliError::structural(source, "project_id not found")),
        }

        match object.get("version") {
            Some(v) if v.as_u64().is_some() => {}
            Some(_) => {
                return Err(CliError::structural(
                    source,
                    "version must be a non-negative integer",
                ));
            }
            None => return Err(CliError::structural(source, "version not found")),
        }

        match object.get("tables") {
            Some(Value::Object(_)) => {}
            Some(_) => return Err(CliError::structural(source, "tables must be an object")),
            None => return Err(CliError::structural(source, "tables not found")),
        }

        serde_json::from_value(value)
            .map_err(|e| CliError::structural(source, format!("malformed schema: {e}")))
    }

    /// Serialize to a JSON value for the wire or for writing to disk.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Json` if serialization fails.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Stored OAuth credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: String,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    #[serde(alias = "expiry")]
    pub expires_at: DateTime<Utc>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Token {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

/// A project as returned by the account API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A single problem reported by remote schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub message: String,

    #[serde(alias = "instancePath", default)]
    pub path: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} ({})", self.message, self.path)
        }
    }
}
