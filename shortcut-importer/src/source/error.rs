//! Issue source error types.

use crate::api::ApiError;
use thiserror::Error;

/// Errors that can occur while reading from GitHub or ZenHub.
#[derive(Debug, Error)]
pub enum SourceError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// ZenHub API error.
    #[error(transparent)]
    ZenHub(#[from] ApiError),

    /// GitHub reported an issue state this importer does not know.
    #[error("Issue {reference} has unsupported state {state}")]
    UnsupportedState { reference: String, state: String },
}
