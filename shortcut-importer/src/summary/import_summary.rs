//! Repository import summary.

use crate::issues::MigrationStatus;
use serde::Serialize;

/// Tallies of a repository import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Issues carrying the epic label.
    pub epics: usize,

    /// All other issues.
    pub stories: usize,

    /// Items created in the workspace.
    pub created: usize,

    /// Issues that were already migrated.
    pub skipped: usize,

    /// Items a dry run would have created.
    pub planned: usize,

    /// Issues numbered below the starting issue (tallied, not migrated).
    pub below_start: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl ImportSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Counts an issue as epic or story.
    pub fn tally(&mut self, is_epic: bool) {
        if is_epic {
            self.epics += 1;
        } else {
            self.stories += 1;
        }
    }

    /// Updates the summary with a migration outcome.
    pub fn record(&mut self, status: &MigrationStatus) {
        match status {
            MigrationStatus::Created(_) => self.created += 1,
            MigrationStatus::Skipped { .. } => self.skipped += 1,
            MigrationStatus::Planned { .. } => self.planned += 1,
        }
    }

    /// Total number of issues seen.
    #[must_use]
    pub fn total(&self) -> usize {
        self.epics + self.stories
    }
}
