//! Schema synchronization between the local config file and the server.
//!
//! This module handles:
//! - Version comparison (`compare`)
//! - Classifying local vs remote into a [`SyncStatus`] (`analyzer`)
//! - The confirmable push and pull flows (`push`, `pull`)
//!
//! Every flow runs the same analysis first, so `status`, `push` and `pull`
//! always agree on where a project stands.

pub mod analyzer;
pub mod compare;
pub mod pull;
pub mod push;

pub use analyzer::{Analysis, SyncStatus, analyze, suggested_actions};
pub use compare::{VersionComparison, VersionStatus, compare_versions};
pub use pull::{PullOrchestrator, PullOutcome, PullState};
pub use push::{PushOrchestrator, PushOutcome, PushState};

use crate::api::SchemaGateway;
use crate::local::LocalSchemaStore;
use std::path::Path;

/// The collaborators a sync flow works against.
#[derive(Clone, Copy)]
pub struct SyncContext<'a> {
    pub local: &'a dyn LocalSchemaStore,
    pub remote: &'a dyn SchemaGateway,
    /// Directory searched for the config file.
    pub dir: &'a Path,
}

impl<'a> SyncContext<'a> {
    #[must_use]
    pub fn new(
        local: &'a dyn LocalSchemaStore,
        remote: &'a dyn SchemaGateway,
        dir: &'a Path,
    ) -> Self {
        Self { local, remote, dir }
    }
}
