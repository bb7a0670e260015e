//! Maintenance error types.

use crate::shortcut::ShortcutError;
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that can occur during workspace maintenance.
#[derive(Debug, Error)]
pub enum MaintenanceError {
    /// Target workspace rejected a call.
    #[error(transparent)]
    Workspace(#[from] ShortcutError),

    /// An iteration name could not be rendered.
    #[error("Template rendering error: {0}")]
    Template(#[from] TemplateError),

    /// The iteration plan violates `period > duration > 0`.
    #[error("Iteration period ({period} days) must exceed duration ({duration} days), and duration must be positive")]
    InvalidPlan { duration: u32, period: u32 },

    /// An iteration date falls outside the supported calendar range.
    #[error("Iteration date out of range")]
    DateOutOfRange,
}
