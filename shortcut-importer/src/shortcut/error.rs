//! Shortcut workspace error types.

use crate::api::ApiError;
use thiserror::Error;

/// Errors raised by the target workspace client.
#[derive(Debug, Error)]
pub enum ShortcutError {
    /// Shortcut API or transport error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The workspace has no story workflow.
    #[error("Workspace has no workflows")]
    NoWorkflows,

    /// No workflow state with this name exists.
    #[error("Unknown workflow state '{name}'")]
    UnknownWorkflowState { name: String },

    /// No epic state with this name exists.
    #[error("Unknown epic state '{name}'")]
    UnknownEpicState { name: String },

    /// No custom field with this name exists.
    #[error("Unknown custom field '{field}'")]
    UnknownCustomField { field: String },

    /// The custom field has no value with this name.
    #[error("'{value}' is not a value of custom field '{field}'")]
    UnknownCustomFieldValue { field: String, value: String },

    /// No team (group) with this mention name exists.
    #[error("Unknown team '{slug}'")]
    UnknownTeam { slug: String },
}

impl ShortcutError {
    /// Returns true if Shortcut reported the item as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_not_found())
    }
}
