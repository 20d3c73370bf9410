//! Classify a local schema against the remote one.
//!
//! The analysis is the single source of truth for `status`, `push` and
//! `pull`. It never writes anything; the only remote calls it makes are a
//! fetch plus one of validate or compare.

use super::SyncContext;
use super::compare::{VersionComparison, VersionStatus, compare_versions};
use crate::error::Result;
use crate::local::LocalSchema;
use crate::model::{Schema, ValidationIssue};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Relationship between the local and remote schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    Current,
    Behind,
    Ahead,
    Conflict,
    Invalid,
    NoSchema,
}

impl SyncStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Behind => "behind",
            Self::Ahead => "ahead",
            Self::Conflict => "conflict",
            Self::Invalid => "invalid",
            Self::NoSchema => "no-schema",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`analyze`].
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub status: SyncStatus,
    pub project_id: Option<String>,
    pub local: Option<LocalSchema>,
    /// The remote schema, or an empty version-0 stand-in when the project
    /// has none yet.
    pub remote: Option<Schema>,
    /// Whether the server actually had a schema.
    pub remote_exists: bool,
    pub comparison: Option<VersionComparison>,
    /// Human-readable findings, in the order they were made.
    pub messages: Vec<String>,
    /// Validation errors reported by the server.
    pub errors: Vec<ValidationIssue>,
    /// Both sides are at version 0; the user must set version 1 first.
    pub requires_version_bump: bool,
}

impl Analysis {
    fn no_schema() -> Self {
        Self {
            status: SyncStatus::NoSchema,
            project_id: None,
            local: None,
            remote: None,
            remote_exists: false,
            comparison: None,
            messages: vec!["no schema found in basic.config.ts, basic.config.js or basic.config.json".to_string()],
            errors: Vec::new(),
            requires_version_bump: false,
        }
    }

    #[must_use]
    pub fn local_version(&self) -> Option<u64> {
        self.comparison.map(|c| c.local_version)
    }

    #[must_use]
    pub fn remote_version(&self) -> Option<u64> {
        self.comparison.map(|c| c.remote_version)
    }

    /// Commands worth running next.
    #[must_use]
    pub fn suggested_actions(&self) -> &'static [&'static str] {
        if self.requires_version_bump {
            return &["set version to 1 in your config, then run: basic push"];
        }
        suggested_actions(self.status)
    }
}

/// Fixed next steps per status.
#[must_use]
pub const fn suggested_actions(status: SyncStatus) -> &'static [&'static str] {
    match status {
        SyncStatus::Current => &[],
        SyncStatus::Behind => &["basic pull"],
        SyncStatus::Ahead => &["basic push"],
        SyncStatus::Conflict => &[
            "basic pull (replaces your local schema with the remote one)",
            "bump version in your config, then run: basic push",
        ],
        SyncStatus::Invalid => &["fix the errors above, then run: basic status"],
        SyncStatus::NoSchema => &["basic init"],
    }
}

/// Compare the local schema in `ctx.dir` with the server's.
///
/// # Errors
///
/// Returns an error if the local config is malformed or any remote call
/// fails. A remote failure is never turned into a status.
pub fn analyze(ctx: &SyncContext<'_>) -> Result<Analysis> {
    let Some(local) = ctx.local.read(ctx.dir)? else {
        info!(dir = %ctx.dir.display(), "No local schema");
        return Ok(Analysis::no_schema());
    };
    let project_id = local.project_id.clone();

    let fetched = ctx.remote.fetch_schema(&project_id)?;
    let remote_exists = fetched.is_some();
    let remote = fetched.unwrap_or_else(|| Schema::empty(project_id.as_str()));

    let comparison = compare_versions(&local.schema, &remote);
    debug!(
        project_id = %project_id,
        local = comparison.local_version,
        remote = comparison.remote_version,
        direction = %comparison.status,
        "Compared versions"
    );

    let mut messages = Vec::new();
    let mut errors = Vec::new();
    let mut requires_version_bump = false;

    let status = match comparison.status {
        VersionStatus::Behind => {
            messages.push(format!(
                "schema is out of date: local version {} is behind remote version {}",
                comparison.local_version, comparison.remote_version
            ));
            SyncStatus::Behind
        }
        VersionStatus::Ahead => {
            messages.push(format!(
                "changes found: local version {} is ahead of remote version {}",
                comparison.local_version, comparison.remote_version
            ));
            let outcome = ctx.remote.validate_schema(&local.schema)?;
            if outcome.valid {
                messages.push("schema changes are valid".to_string());
                SyncStatus::Ahead
            } else {
                messages.push("errors found in schema".to_string());
                errors = outcome.errors;
                SyncStatus::Invalid
            }
        }
        VersionStatus::Equal if comparison.both_unversioned() => {
            let outcome = ctx.remote.validate_schema(&local.schema)?;
            if outcome.valid {
                requires_version_bump = true;
                messages.push(
                    "schema is at version 0: bump version to 1 before pushing".to_string(),
                );
                SyncStatus::Ahead
            } else {
                messages.push("errors found in schema".to_string());
                errors = outcome.errors;
                SyncStatus::Invalid
            }
        }
        VersionStatus::Equal => {
            if ctx.remote.compare_schema(&local.schema)? {
                messages.push("schema is up to date".to_string());
                SyncStatus::Current
            } else {
                messages.push(format!(
                    "schema conflict: local schema differs from remote schema at version {}",
                    comparison.remote_version
                ));
                SyncStatus::Conflict
            }
        }
    };

    info!(project_id = %project_id, %status, "Analyzed schema");
    Ok(Analysis {
        status,
        project_id: Some(project_id),
        local: Some(local),
        remote: Some(remote),
        remote_exists,
        comparison: Some(comparison),
        messages,
        errors,
        requires_version_bump,
    })
}
