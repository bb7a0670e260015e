//! GitHub issue source backed by octocrab.

use super::{IssueSource, SourceError};
use crate::rate_limit::ensure_core_rate_limit;
use crate::types::{IssueKey, IssueState, SourceComment, SourceIssue};
use async_trait::async_trait;
use octocrab::models::issues::{Comment, Issue};
use octocrab::{params, Octocrab};
use tracing::debug;

/// Page size for issue and comment listings (GitHub's maximum).
const PER_PAGE: u8 = 100;

/// Reads issues and comments through the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    octocrab: Octocrab,
}

impl GitHubSource {
    /// Builds a source authenticated with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the GitHub client cannot be built.
    pub fn new(token: String) -> Result<Self, SourceError> {
        let octocrab = Octocrab::builder().personal_token(token).build()?;
        Ok(Self { octocrab })
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn from_octocrab(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }
}

#[async_trait]
impl IssueSource for GitHubSource {
    async fn repository_id(&self, org: &str, repo: &str) -> Result<u64, SourceError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        let repository = self.octocrab.repos(org, repo).get().await?;
        Ok(repository.id.into_inner())
    }

    async fn list_issues(&self, org: &str, repo: &str) -> Result<Vec<SourceIssue>, SourceError> {
        let repo_id = self.repository_id(org, repo).await?;

        ensure_core_rate_limit(&self.octocrab).await?;
        let first_page = self
            .octocrab
            .issues(org, repo)
            .list()
            .state(params::State::All)
            .sort(params::issues::Sort::Created)
            .direction(params::Direction::Ascending)
            .per_page(PER_PAGE)
            .send()
            .await?;
        let issues = self.octocrab.all_pages(first_page).await?;

        let total = issues.len();
        let issues = issues
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(|issue| convert_issue(org, repo, repo_id, issue))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            repo = %format!("{org}/{repo}"),
            issues = issues.len(),
            pull_requests = total - issues.len(),
            "Fetched issues"
        );
        Ok(issues)
    }

    async fn get_issue(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<SourceIssue, SourceError> {
        let repo_id = self.repository_id(org, repo).await?;

        ensure_core_rate_limit(&self.octocrab).await?;
        let issue = self.octocrab.issues(org, repo).get(number).await?;
        convert_issue(org, repo, repo_id, issue)
    }

    async fn comments(&self, issue: &SourceIssue) -> Result<Vec<SourceComment>, SourceError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        let first_page = self
            .octocrab
            .issues(&issue.org, &issue.repo)
            .list_comments(issue.key.number)
            .per_page(PER_PAGE)
            .send()
            .await?;
        let comments = self.octocrab.all_pages(first_page).await?;

        Ok(comments.into_iter().map(convert_comment).collect())
    }
}

fn convert_issue(
    org: &str,
    repo: &str,
    repo_id: u64,
    issue: Issue,
) -> Result<SourceIssue, SourceError> {
    let state = match issue.state {
        octocrab::models::IssueState::Open => IssueState::Open,
        octocrab::models::IssueState::Closed => IssueState::Closed,
        other => {
            return Err(SourceError::UnsupportedState {
                reference: format!("{org}/{repo}#{}", issue.number),
                state: format!("{other:?}"),
            })
        }
    };

    Ok(SourceIssue {
        key: IssueKey::new(repo_id, issue.number),
        org: org.to_string(),
        repo: repo.to_string(),
        title: issue.title,
        body: issue.body,
        created_at: issue.created_at,
        state,
        assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
        author: issue.user.login,
        labels: issue.labels.into_iter().map(|l| l.name).collect(),
        url: issue.html_url.to_string(),
    })
}

fn convert_comment(comment: Comment) -> SourceComment {
    SourceComment {
        author: comment.user.login,
        created_at: comment.created_at,
        body: comment.body.unwrap_or_default(),
    }
}
