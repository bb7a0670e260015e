//! Migration error types.

use crate::ledger::LedgerError;
use crate::shortcut::ShortcutError;
use crate::source::SourceError;
use crate::templates::TemplateError;
use crate::types::IssueState;
use thiserror::Error;

/// Errors that can occur while migrating issues or linking epics.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Target workspace rejected a call.
    #[error(transparent)]
    Workspace(#[from] ShortcutError),

    /// Reading from GitHub or ZenHub failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Reading or writing the ledger failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The provenance header could not be rendered.
    #[error("Template rendering error: {0}")]
    Template(#[from] TemplateError),

    /// A state map has no entry for the issue's state.
    #[error("{map} has no entry for GitHub state '{state}'")]
    MissingStateMapping {
        map: &'static str,
        state: IssueState,
    },
}
