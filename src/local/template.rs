//! Starter config file written by `basic init`.

use super::{CONFIG_FILES, JS_CONFIG_FILE, TS_CONFIG_FILE};
use crate::error::{CliError, Result};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

/// Which flavor of config module to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigLanguage {
    #[default]
    TypeScript,
    JavaScript,
}

impl ConfigLanguage {
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::TypeScript => TS_CONFIG_FILE,
            Self::JavaScript => JS_CONFIG_FILE,
        }
    }
}

/// Schema a fresh project starts with: one `example` collection.
#[must_use]
pub fn default_schema(project_id: &str) -> Value {
    json!({
        "project_id": project_id,
        "version": 1,
        "tables": {
            "example": {
                "name": "example",
                "type": "collection",
                "fields": {
                    "value": {"type": "string"}
                }
            }
        }
    })
}

/// Render the config module text.
///
/// # Errors
///
/// Returns `CliError::Json` if a value cannot be serialized.
pub fn render_config(name: &str, project_id: &str, schema: &Value) -> Result<String> {
    let name = serde_json::to_string(name)?;
    let project_id = serde_json::to_string(project_id)?;
    let schema = serde_json::to_string_pretty(schema)?;
    Ok(format!(
        "// Basic Project Configuration\n\
         // see the docs for more info: https://docs.basic.tech\n\
         export const config = {{\n  name: {name},\n  project_id: {project_id}\n}};\n\
         \n\
         export const schema = {schema};\n"
    ))
}

/// First config file already present in `dir`, if any.
#[must_use]
pub fn existing_config(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|file| dir.join(file))
        .find(|path| path.exists())
}

/// Create the config module in `dir`.
///
/// Uses `schema` when given (an existing project's remote schema),
/// otherwise [`default_schema`].
///
/// # Errors
///
/// Returns `CliError::AlreadyInitialized` if any config file already
/// exists, or an I/O error if the file cannot be written.
pub fn create_config(
    dir: &Path,
    language: ConfigLanguage,
    name: &str,
    project_id: &str,
    schema: Option<&Value>,
) -> Result<PathBuf> {
    if let Some(existing) = existing_config(dir) {
        return Err(CliError::AlreadyInitialized { path: existing });
    }

    let fallback = default_schema(project_id);
    let content = render_config(name, project_id, schema.unwrap_or(&fallback))?;
    let path = dir.join(language.file_name());
    fs::write(&path, content)?;
    tracing::info!(file = %path.display(), project_id, "Created config file");
    Ok(path)
}
