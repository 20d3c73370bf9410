use crate::model::Schema;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Where the local version sits relative to the remote one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    Ahead,
    Behind,
    Equal,
}

impl VersionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ahead => "ahead",
            Self::Behind => "behind",
            Self::Equal => "equal",
        }
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionComparison {
    pub status: VersionStatus,
    pub local_version: u64,
    pub remote_version: u64,
}

impl VersionComparison {
    /// Neither side has ever been versioned.
    #[must_use]
    pub const fn both_unversioned(&self) -> bool {
        self.local_version == 0 && self.remote_version == 0
    }
}

/// Compare by `version` only; content is never looked at here.
#[must_use]
pub fn compare_versions(local: &Schema, remote: &Schema) -> VersionComparison {
    let status = match local.version.cmp(&remote.version) {
        Ordering::Greater => VersionStatus::Ahead,
        Ordering::Less => VersionStatus::Behind,
        Ordering::Equal => VersionStatus::Equal,
    };
    VersionComparison {
        status,
        local_version: local.version,
        remote_version: remote.version,
    }
}
