use super::{Extracted, SchemaExtractor};
use crate::error::{CliError, Result};
use serde_json::Value;
use std::path::Path;

/// `basic.config.json`: the whole document is the schema.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExtractor;

impl SchemaExtractor for JsonExtractor {
    fn extract(&self, source: &str, path: &Path) -> Result<Option<Extracted>> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(trimmed).map_err(|e| CliError::ConfigParse {
            file: path.to_path_buf(),
            details: e.to_string(),
        })?;

        let start = source.len() - source.trim_start().len();
        Ok(Some(Extracted {
            value,
            span: start..start + trimmed.len(),
        }))
    }
}
