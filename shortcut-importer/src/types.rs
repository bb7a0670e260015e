//! Core types shared across the importer.
//!
//! This module contains the data that flows between the issue source, the
//! migration logic and the target workspace:
//! - [`IssueKey`], [`SourceIssue`] and [`SourceComment`] - what we read from GitHub
//! - [`NewEpic`], [`NewStory`] and [`NewComment`] - what we ask Shortcut to create
//! - [`TargetItem`] and [`EpicSummary`] - what Shortcut hands back

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

/// Identifies a source issue across runs: the GitHub repository id plus the issue number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IssueKey {
    /// Numeric GitHub repository id (stable across renames).
    pub repo_id: u64,

    /// Issue number within the repository.
    pub number: u64,
}

impl IssueKey {
    /// Creates a key from its parts.
    #[must_use]
    pub fn new(repo_id: u64, number: u64) -> Self {
        Self { repo_id, number }
    }

    /// Returns the stable string form used as the ledger key, e.g. `(1234, 42)`.
    #[must_use]
    pub fn ledger_key(&self) -> String {
        format!("({}, {})", self.repo_id, self.number)
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ledger_key())
    }
}

/// Open/closed state of a GitHub issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    /// Returns the state name as used in the configured state maps.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An issue fetched from GitHub. Immutable for the rest of the run.
#[derive(Debug, Clone)]
pub struct SourceIssue {
    /// Repository id and issue number.
    pub key: IssueKey,

    /// Organization (or user) owning the repository.
    pub org: String,

    /// Repository name.
    pub repo: String,

    /// Issue title.
    pub title: String,

    /// Issue body, if any.
    pub body: Option<String>,

    /// When the issue was opened.
    pub created_at: DateTime<Utc>,

    /// Open or closed.
    pub state: IssueState,

    /// Logins of assigned users.
    pub assignees: Vec<String>,

    /// Login of the issue author.
    pub author: String,

    /// Label names.
    pub labels: Vec<String>,

    /// Public HTML URL; doubles as the external link on the migrated story.
    pub url: String,
}

impl SourceIssue {
    /// Returns true if the issue carries the designated epic label.
    #[must_use]
    pub fn is_epic(&self, epic_label: &str) -> bool {
        self.labels.iter().any(|label| label == epic_label)
    }

    /// Returns the short reference, e.g. `org/repo#42`.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{}/{}#{}", self.org, self.repo, self.key.number)
    }
}

/// A comment on a source issue.
#[derive(Debug, Clone)]
pub struct SourceComment {
    /// Login of the comment author.
    pub author: String,

    /// When the comment was posted.
    pub created_at: DateTime<Utc>,

    /// Comment text (markdown).
    pub body: String,
}

/// Kind of item created in the target workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Epic,
    Story,
    Iteration,
}

impl ItemKind {
    /// Lowercase name for logs and summaries.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Epic => "epic",
            Self::Story => "story",
            Self::Iteration => "iteration",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item that exists in the target workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetItem {
    /// Public id of the item.
    pub id: u64,

    /// Link to the item in the Shortcut web app.
    pub app_url: String,

    /// What kind of item this is.
    pub kind: ItemKind,
}

/// Fields common to new epics and stories.
///
/// Owners and requester are target mention names; the workspace client
/// resolves them to member ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFields {
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub owners: Vec<String>,
    pub requested_by: Option<String>,
    pub external_id: String,
    pub labels: Vec<String>,
}

/// Request to create an epic.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEpic {
    pub fields: ItemFields,

    /// Epic state name, e.g. "to do".
    pub state: String,
}

/// Selection of one value of an enumerated custom field, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFieldSelection {
    pub field: String,
    pub value: String,
}

/// Request to create a story.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStory {
    pub fields: ItemFields,

    /// Workflow state name, e.g. "Unscheduled".
    pub state: String,

    /// Story points.
    pub estimate: Option<i64>,

    pub custom_fields: Vec<CustomFieldSelection>,

    pub external_links: Vec<String>,
}

/// Request to create a comment on a story or epic.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub text: String,

    /// Author mention name.
    pub author: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Partial update of a story. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryPatch {
    pub archived: Option<bool>,
    pub epic_id: Option<u64>,
    pub external_links: Option<Vec<String>>,
}

/// Partial update of an epic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpicPatch {
    pub archived: Option<bool>,
}

/// Minimal view of an existing epic, used when archiving.
#[derive(Debug, Clone, PartialEq)]
pub struct EpicSummary {
    pub id: u64,
    pub name: String,
    pub archived: bool,
    pub updated_at: DateTime<Utc>,
}

/// Request to create an iteration (sprint).
#[derive(Debug, Clone, PartialEq)]
pub struct NewIteration {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Team (group) mention name the iteration belongs to.
    pub team_slug: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_key_matches_tuple_form() {
        let key = IssueKey::new(1234, 42);
        assert_eq!(key.ledger_key(), "(1234, 42)");
        assert_eq!(key.to_string(), "(1234, 42)");
    }

    #[test]
    fn detects_epic_label() {
        let issue = SourceIssue {
            key: IssueKey::new(1, 2),
            org: "org".to_string(),
            repo: "repo".to_string(),
            title: "Title".to_string(),
            body: None,
            created_at: Utc::now(),
            state: IssueState::Open,
            assignees: Vec::new(),
            author: "alice".to_string(),
            labels: vec!["bug".to_string(), "Epic".to_string()],
            url: "https://github.com/org/repo/issues/2".to_string(),
        };

        assert!(issue.is_epic("Epic"));
        assert!(!issue.is_epic("epic"));
        assert_eq!(issue.reference(), "org/repo#2");
    }
}
