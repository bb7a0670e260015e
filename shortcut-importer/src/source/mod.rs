//! Remote issue sources.
//!
//! [`IssueSource`] reads issues and comments from GitHub; [`EpicSource`]
//! reads epic membership and estimates from ZenHub.

mod error;
mod github;
mod zenhub;

pub use error::SourceError;
pub use github::GitHubSource;
pub use zenhub::ZenHubClient;

use crate::types::{IssueKey, SourceComment, SourceIssue};
use async_trait::async_trait;

/// Read access to issues and their comments.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Returns the numeric id of `org/repo`.
    async fn repository_id(&self, org: &str, repo: &str) -> Result<u64, SourceError>;

    /// Returns every issue of `org/repo` (open and closed), oldest first.
    ///
    /// Each call walks the full listing again from the start.
    async fn list_issues(&self, org: &str, repo: &str) -> Result<Vec<SourceIssue>, SourceError>;

    /// Returns a single issue.
    async fn get_issue(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<SourceIssue, SourceError>;

    /// Returns the comments of an issue in posting order.
    async fn comments(&self, issue: &SourceIssue) -> Result<Vec<SourceComment>, SourceError>;
}

/// Read access to epic membership and estimates.
#[async_trait]
pub trait EpicSource: Send + Sync {
    /// Returns the epics of a repository.
    async fn epics(&self, repo_id: u64) -> Result<Vec<IssueKey>, SourceError>;

    /// Returns the child issues of one epic.
    async fn epic_children(
        &self,
        repo_id: u64,
        epic_number: u64,
    ) -> Result<Vec<IssueKey>, SourceError>;

    /// Returns the estimate of an issue, if it has one.
    async fn estimate(&self, key: IssueKey) -> Result<Option<f64>, SourceError>;
}
