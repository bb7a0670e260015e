//! Epic linking summary.

use serde::Serialize;

/// Tallies of an epic linking pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkSummary {
    /// Stories assigned to their epic.
    pub linked: usize,

    /// Links a dry run would have made.
    pub planned: usize,

    /// Epics with no ledger entry.
    pub epics_skipped: usize,

    /// Children with no ledger entry.
    pub children_skipped: usize,

    /// Ledgered stories that no longer exist in the workspace.
    pub missing_targets: usize,
}
