//! Migration status types.

use crate::types::{ItemKind, TargetItem};
use serde::Serialize;

/// Outcome of migrating a single issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MigrationStatus {
    /// A new epic or story was created.
    Created(TargetItem),

    /// The issue was already migrated.
    Skipped {
        /// Reason for skipping.
        reason: String,
    },

    /// Dry run: the issue would have been created as `kind`.
    Planned {
        kind: ItemKind,
    },
}

impl MigrationStatus {
    /// Returns true if the issue was skipped.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}
