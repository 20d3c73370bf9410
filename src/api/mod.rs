//! The Basic REST API.
//!
//! [`SchemaGateway`] is the seam the sync flows talk to; [`ApiClient`] is
//! the HTTP implementation and also carries the account and project calls
//! the other commands need.

mod client;
pub mod release;

pub use client::ApiClient;

use crate::error::Result;
use crate::model::{Schema, ValidationIssue};
use serde::{Deserialize, Serialize};

/// Result of asking the server whether a schema may replace the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    #[serde(default)]
    pub valid: bool,

    #[serde(default)]
    pub errors: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn invalid(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// Remote side of schema sync.
pub trait SchemaGateway {
    /// Current published schema, or `None` if the project has none yet.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or a body
    /// that is not a schema.
    fn fetch_schema(&self, project_id: &str) -> Result<Option<Schema>>;

    /// Publish `schema` as the project's schema.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    fn push_schema(&self, project_id: &str, schema: &Schema) -> Result<()>;

    /// Check whether `schema` is an acceptable update.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    fn validate_schema(&self, schema: &Schema) -> Result<ValidationOutcome>;

    /// Whether `schema` has the same content as the published schema of
    /// the same version.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    fn compare_schema(&self, schema: &Schema) -> Result<bool>;
}
