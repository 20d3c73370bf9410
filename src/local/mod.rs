//! Reading and writing the schema held in a project's config file.
//!
//! A project directory holds at most one of the config files below; they
//! are tried in this order. A file that exists but holds no schema is
//! skipped, a file that cannot be parsed is an error.
//!
//! Each format has a [`SchemaExtractor`] that finds the schema object and
//! its byte range, so a write can swap that range and leave every other
//! byte of the file alone.

mod json;
mod script;
pub mod template;

pub use json::JsonExtractor;
pub use script::ScriptExtractor;

use crate::error::{CliError, Result};
use crate::model::Schema;
use serde_json::Value;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const TS_CONFIG_FILE: &str = "basic.config.ts";
pub const JS_CONFIG_FILE: &str = "basic.config.js";
pub const JSON_CONFIG_FILE: &str = "basic.config.json";

/// Config file names in lookup order.
pub const CONFIG_FILES: [&str; 3] = [TS_CONFIG_FILE, JS_CONFIG_FILE, JSON_CONFIG_FILE];

/// A schema object found inside a config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub value: Value,
    /// Byte range of the schema object in the source text.
    pub span: Range<usize>,
}

/// Finds the schema object in one config file format.
pub trait SchemaExtractor {
    /// Locate the schema in `source`. `Ok(None)` means the file parsed
    /// but holds no schema.
    ///
    /// # Errors
    ///
    /// Returns `CliError::ConfigParse` if `source` is not valid for this
    /// format or the schema uses an expression that is not a plain literal.
    fn extract(&self, source: &str, path: &Path) -> Result<Option<Extracted>>;

    /// Text that replaces the schema's byte range on write.
    ///
    /// `indent` is the leading whitespace of the line the range starts on.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Json` if the value cannot be serialized.
    fn render(&self, value: &Value, indent: &str) -> Result<String> {
        let pretty = serde_json::to_string_pretty(value)?;
        Ok(reindent(&pretty, indent))
    }
}

/// Pick the extractor for a config file by extension.
#[must_use]
pub fn extractor_for(path: &Path) -> &'static dyn SchemaExtractor {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => &JsonExtractor,
        _ => &ScriptExtractor,
    }
}

/// A schema read from disk, with the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSchema {
    pub schema: Schema,
    pub project_id: String,
    pub file_path: PathBuf,
}

/// Read/write access to the local schema.
pub trait LocalSchemaStore {
    /// Read the schema from the first config file in `dir` that has one.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be read or parsed, or its
    /// schema is missing required keys.
    fn read(&self, dir: &Path) -> Result<Option<LocalSchema>>;

    /// Replace the schema in the first config file that has one, or create
    /// `basic.config.json` when none does. Returns the written path.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be read, parsed or written.
    fn write(&self, schema: &Schema, dir: &Path) -> Result<PathBuf>;
}

/// The on-disk config file store.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigFileStore;

impl ConfigFileStore {
    /// Yield `(path, source, extracted)` for the first config file that
    /// holds a schema.
    fn locate(dir: &Path) -> Result<Option<(PathBuf, String, Extracted)>> {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            if !path.is_file() {
                continue;
            }
            let source = fs::read_to_string(&path)?;
            match extractor_for(&path).extract(&source, &path)? {
                Some(extracted) => {
                    debug!(file = %path.display(), span = ?extracted.span, "Found schema");
                    return Ok(Some((path, source, extracted)));
                }
                None => debug!(file = %path.display(), "Config file holds no schema"),
            }
        }
        Ok(None)
    }
}

impl LocalSchemaStore for ConfigFileStore {
    fn read(&self, dir: &Path) -> Result<Option<LocalSchema>> {
        let Some((file_path, _, extracted)) = Self::locate(dir)? else {
            return Ok(None);
        };
        let schema = Schema::from_local_value(extracted.value, &file_path)?;
        Ok(Some(LocalSchema {
            project_id: schema.project_id.clone(),
            schema,
            file_path,
        }))
    }

    fn write(&self, schema: &Schema, dir: &Path) -> Result<PathBuf> {
        let value = schema.to_value()?;

        let Some((path, source, extracted)) = Self::locate(dir)? else {
            let path = dir.join(JSON_CONFIG_FILE);
            let mut body = JsonExtractor.render(&value, "")?;
            body.push('\n');
            fs::write(&path, body)?;
            info!(file = %path.display(), "Created config file");
            return Ok(path);
        };

        let indent = line_indent(&source, extracted.span.start);
        let rendered = extractor_for(&path).render(&value, indent)?;
        let updated = splice(&source, extracted.span, &rendered)?;
        fs::write(&path, updated)?;
        info!(file = %path.display(), version = schema.version, "Wrote schema");
        Ok(path)
    }
}

/// Replace `span` in `source` with `replacement`.
fn splice(source: &str, span: Range<usize>, replacement: &str) -> Result<String> {
    let (Some(before), Some(after)) = (source.get(..span.start), source.get(span.end..)) else {
        return Err(CliError::Config(format!(
            "schema range {}..{} does not fall on character boundaries",
            span.start, span.end
        )));
    };
    let mut out = String::with_capacity(before.len() + replacement.len() + after.len());
    out.push_str(before);
    out.push_str(replacement);
    out.push_str(after);
    Ok(out)
}

/// Leading whitespace of the line containing byte `offset`.
fn line_indent(source: &str, offset: usize) -> &str {
    let line_start = source
        .get(..offset)
        .and_then(|head| head.rfind('\n'))
        .map_or(0, |nl| nl + 1);
    let line = source.get(line_start..).unwrap_or_default();
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Prefix every line after the first with `indent`.
fn reindent(text: &str, indent: &str) -> String {
    if indent.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str(indent);
        }
        out.push_str(line);
    }
    out
}
