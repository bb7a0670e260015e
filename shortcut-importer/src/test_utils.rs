//! In-memory fakes of the remote services.

use crate::api::ApiError;
use crate::identity::IdentityMapper;
use crate::issues::{MigrationContext, MigrationSettings};
use crate::shortcut::{sample_metadata, ShortcutError, Workspace, WorkspaceMetadata};
use crate::source::{EpicSource, IssueSource, SourceError};
use crate::templates::TemplateRenderer;
use crate::types::{
    EpicPatch, EpicSummary, IssueKey, IssueState, ItemKind, NewComment, NewEpic, NewIteration,
    NewStory, SourceComment, SourceIssue, StoryPatch, TargetItem,
};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub(crate) const REPO_ID: u64 = 1234;

pub(crate) fn sample_issue(number: u64) -> SourceIssue {
    let created_at = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
        + Duration::minutes(i64::try_from(number).unwrap());
    SourceIssue {
        key: IssueKey::new(REPO_ID, number),
        org: "org".to_string(),
        repo: "repo".to_string(),
        title: format!("Issue {number}"),
        body: Some(format!("Body of issue {number}")),
        created_at,
        state: IssueState::Open,
        assignees: vec!["alice".to_string(), "mallory".to_string()],
        author: "alice".to_string(),
        labels: Vec::new(),
        url: format!("https://github.com/org/repo/issues/{number}"),
    }
}

pub(crate) fn sample_comment(author: &str, body: &str) -> SourceComment {
    SourceComment {
        author: author.to_string(),
        created_at: Utc.with_ymd_and_hms(2021, 2, 1, 0, 0, 0).unwrap(),
        body: body.to_string(),
    }
}

pub(crate) fn sample_settings() -> MigrationSettings {
    MigrationSettings {
        epic_state_map: HashMap::from([
            ("open".to_string(), "to do".to_string()),
            ("closed".to_string(), "done".to_string()),
        ]),
        issue_state_map: HashMap::from([
            ("open".to_string(), "Unscheduled".to_string()),
            ("closed".to_string(), "Done".to_string()),
        ]),
        ..MigrationSettings::default()
    }
}

fn remote_error(status: u16) -> ApiError {
    let message = match status {
        404 => "Resource not found.",
        422 => "Unprocessable Entity",
        _ => "Request failed",
    };
    ApiError::Remote {
        service: "Shortcut",
        status,
        message: message.to_string(),
    }
}

/// A write made against [`FakeWorkspace`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WorkspaceCall {
    CreateEpic(NewEpic),
    CreateStory(NewStory),
    EpicComment(u64, NewComment),
    StoryComment(u64, NewComment),
    UpdateStory(u64, StoryPatch),
    UpdateEpic(u64, EpicPatch),
    CreateIteration(NewIteration),
}

#[derive(Debug)]
struct WorkspaceState {
    calls: Vec<WorkspaceCall>,
    next_id: u64,
    links: HashMap<String, Vec<u64>>,
    /// Target id to the HTTP status every write against it fails with.
    failures: HashMap<u64, u16>,
    epics: Vec<EpicSummary>,
}

/// Workspace that records writes and answers reads from memory.
///
/// Clones share state, so a test can keep a handle to a workspace it hands out.
#[derive(Debug, Clone)]
pub(crate) struct FakeWorkspace {
    state: Arc<Mutex<WorkspaceState>>,
    metadata: WorkspaceMetadata,
}

impl Default for FakeWorkspace {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(WorkspaceState {
                calls: Vec::new(),
                next_id: 1000,
                links: HashMap::new(),
                failures: HashMap::new(),
                epics: Vec::new(),
            })),
            metadata: sample_metadata(),
        }
    }
}

impl FakeWorkspace {
    pub(crate) fn calls(&self) -> Vec<WorkspaceCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    WorkspaceCall::CreateEpic(_) | WorkspaceCall::CreateStory(_)
                )
            })
            .count()
    }

    pub(crate) fn link_existing_story(&self, url: &str, story_id: u64) {
        self.state
            .lock()
            .unwrap()
            .links
            .entry(url.to_string())
            .or_default()
            .push(story_id);
    }

    pub(crate) fn mark_missing(&self, id: u64) {
        self.state.lock().unwrap().failures.insert(id, 404);
    }

    /// Makes every write against `id` fail with 422.
    pub(crate) fn mark_rejected(&self, id: u64) {
        self.state.lock().unwrap().failures.insert(id, 422);
    }

    pub(crate) fn add_epic(&self, epic: EpicSummary) {
        self.state.lock().unwrap().epics.push(epic);
    }

    fn write(&self, call: WorkspaceCall, target: Option<u64>) -> Result<(), ShortcutError> {
        let mut state = self.state.lock().unwrap();
        if let Some(&status) = target.and_then(|id| state.failures.get(&id)) {
            return Err(remote_error(status).into());
        }
        state.calls.push(call);
        Ok(())
    }

    fn create(&self, call: WorkspaceCall, kind: ItemKind, links: &[String]) -> TargetItem {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        for link in links {
            state.links.entry(link.clone()).or_default().push(id);
        }
        state.calls.push(call);
        TargetItem {
            id,
            app_url: format!("https://app.shortcut.com/acme/{kind}/{id}"),
            kind,
        }
    }
}

#[async_trait]
impl Workspace for FakeWorkspace {
    fn validate_epic(&self, epic: &NewEpic) -> Result<(), ShortcutError> {
        self.metadata.check_epic(epic)
    }

    fn validate_story(&self, story: &NewStory) -> Result<(), ShortcutError> {
        self.metadata.check_story(story)
    }

    async fn create_epic(&self, epic: &NewEpic) -> Result<TargetItem, ShortcutError> {
        Ok(self.create(WorkspaceCall::CreateEpic(epic.clone()), ItemKind::Epic, &[]))
    }

    async fn create_story(&self, story: &NewStory) -> Result<TargetItem, ShortcutError> {
        Ok(self.create(
            WorkspaceCall::CreateStory(story.clone()),
            ItemKind::Story,
            &story.external_links,
        ))
    }

    async fn create_epic_comment(
        &self,
        epic_id: u64,
        comment: &NewComment,
    ) -> Result<(), ShortcutError> {
        self.write(WorkspaceCall::EpicComment(epic_id, comment.clone()), Some(epic_id))
    }

    async fn create_story_comment(
        &self,
        story_id: u64,
        comment: &NewComment,
    ) -> Result<(), ShortcutError> {
        self.write(WorkspaceCall::StoryComment(story_id, comment.clone()), Some(story_id))
    }

    async fn update_story(&self, story_id: u64, patch: &StoryPatch) -> Result<(), ShortcutError> {
        self.write(WorkspaceCall::UpdateStory(story_id, patch.clone()), Some(story_id))
    }

    async fn update_epic(&self, epic_id: u64, patch: &EpicPatch) -> Result<(), ShortcutError> {
        self.write(WorkspaceCall::UpdateEpic(epic_id, patch.clone()), Some(epic_id))
    }

    async fn find_stories_by_external_link(
        &self,
        external_link: &str,
    ) -> Result<Vec<TargetItem>, ShortcutError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .links
            .get(external_link)
            .into_iter()
            .flatten()
            .map(|&id| TargetItem {
                id,
                app_url: format!("https://app.shortcut.com/acme/story/{id}"),
                kind: ItemKind::Story,
            })
            .collect())
    }

    async fn list_epics(&self) -> Result<Vec<EpicSummary>, ShortcutError> {
        Ok(self.state.lock().unwrap().epics.clone())
    }

    async fn create_iteration(
        &self,
        iteration: &NewIteration,
    ) -> Result<TargetItem, ShortcutError> {
        Ok(self.create(
            WorkspaceCall::CreateIteration(iteration.clone()),
            ItemKind::Iteration,
            &[],
        ))
    }
}

/// Issue source backed by a list of issues.
#[derive(Debug, Default)]
pub(crate) struct FakeIssueSource {
    issues: Vec<SourceIssue>,
    comments: HashMap<u64, Vec<SourceComment>>,
}

impl FakeIssueSource {
    pub(crate) fn add_issue(&mut self, issue: SourceIssue) {
        self.issues.push(issue);
    }

    pub(crate) fn add_comments(&mut self, number: u64, comments: Vec<SourceComment>) {
        self.comments.entry(number).or_default().extend(comments);
    }
}

#[async_trait]
impl IssueSource for FakeIssueSource {
    async fn repository_id(&self, _org: &str, _repo: &str) -> Result<u64, SourceError> {
        Ok(REPO_ID)
    }

    async fn list_issues(&self, _org: &str, _repo: &str) -> Result<Vec<SourceIssue>, SourceError> {
        let mut issues = self.issues.clone();
        issues.sort_by_key(|issue| issue.created_at);
        Ok(issues)
    }

    async fn get_issue(
        &self,
        _org: &str,
        _repo: &str,
        number: u64,
    ) -> Result<SourceIssue, SourceError> {
        self.issues
            .iter()
            .find(|issue| issue.key.number == number)
            .cloned()
            .ok_or_else(|| {
                ApiError::Remote {
                    service: "GitHub",
                    status: 404,
                    message: "Not Found".to_string(),
                }
                .into()
            })
    }

    async fn comments(&self, issue: &SourceIssue) -> Result<Vec<SourceComment>, SourceError> {
        Ok(self
            .comments
            .get(&issue.key.number)
            .cloned()
            .unwrap_or_default())
    }
}

/// Epic source backed by in-memory epics and estimates.
#[derive(Debug, Default)]
pub(crate) struct FakeEpicSource {
    epics: Vec<u64>,
    children: HashMap<u64, Vec<u64>>,
    estimates: HashMap<IssueKey, f64>,
}

impl FakeEpicSource {
    pub(crate) fn add_epic(&mut self, number: u64, children: &[u64]) {
        self.epics.push(number);
        self.children.insert(number, children.to_vec());
    }

    pub(crate) fn set_estimate(&mut self, key: IssueKey, value: f64) {
        self.estimates.insert(key, value);
    }
}

#[async_trait]
impl EpicSource for FakeEpicSource {
    async fn epics(&self, repo_id: u64) -> Result<Vec<IssueKey>, SourceError> {
        Ok(self
            .epics
            .iter()
            .map(|&number| IssueKey::new(repo_id, number))
            .collect())
    }

    async fn epic_children(
        &self,
        repo_id: u64,
        epic_number: u64,
    ) -> Result<Vec<IssueKey>, SourceError> {
        Ok(self
            .children
            .get(&epic_number)
            .into_iter()
            .flatten()
            .map(|&number| IssueKey::new(repo_id, number))
            .collect())
    }

    async fn estimate(&self, key: IssueKey) -> Result<Option<f64>, SourceError> {
        Ok(self.estimates.get(&key).copied())
    }
}

/// Fakes plus the local pieces a migration needs.
pub(crate) struct Harness {
    pub workspace: FakeWorkspace,
    pub source: FakeIssueSource,
    pub epics: FakeEpicSource,
    pub identities: IdentityMapper,
    pub renderer: TemplateRenderer,
    pub settings: MigrationSettings,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self {
            workspace: FakeWorkspace::default(),
            source: FakeIssueSource::default(),
            epics: FakeEpicSource::default(),
            identities: IdentityMapper::new(
                HashMap::from([
                    ("alice".to_string(), "alice.sc".to_string()),
                    ("bob".to_string(), "bob.sc".to_string()),
                ]),
                true,
            ),
            renderer: TemplateRenderer::new(),
            settings: sample_settings(),
        }
    }

    pub(crate) fn context(&self, dry_run: bool) -> MigrationContext<'_> {
        MigrationContext {
            workspace: &self.workspace,
            source: &self.source,
            epics: None,
            identities: &self.identities,
            renderer: &self.renderer,
            settings: &self.settings,
            dry_run,
        }
    }

    pub(crate) fn context_with_estimates(&self, dry_run: bool) -> MigrationContext<'_> {
        MigrationContext {
            epics: Some(&self.epics),
            ..self.context(dry_run)
        }
    }
}
