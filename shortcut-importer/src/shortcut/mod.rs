//! Target workspace client.
//!
//! [`Workspace`] is the set of Shortcut operations the importer needs;
//! [`ShortcutClient`] implements it against the Shortcut REST API, resolving
//! state, member, custom-field and team names through [`WorkspaceMetadata`].

mod error;
mod metadata;
mod models;

pub use error::ShortcutError;
pub use metadata::{CustomFieldInfo, WorkspaceMetadata};

#[cfg(test)]
pub(crate) use metadata::tests::sample_metadata;

use crate::api::ApiClient;
use crate::rate_limit::RateLimit;
use crate::types::{
    EpicPatch, EpicSummary, ItemFields, ItemKind, NewComment, NewEpic, NewIteration, NewStory,
    StoryPatch, TargetItem,
};
use async_trait::async_trait;
use models::{
    format_date, format_timestamp, CreateCommentBody, CreateEpicBody, CreateIterationBody,
    CreateStoryBody, CustomFieldParams, EpicRecord, ItemRecord, LabelParams, UpdateEpicBody,
    UpdateStoryBody,
};
use serde::de::IgnoredAny;
use tracing::debug;

/// Header carrying the Shortcut API token.
const TOKEN_HEADER: &str = "shortcut-token";

/// Operations on the target Shortcut workspace. Each async call is one HTTP exchange.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// Checks that every name in `epic` resolves in this workspace, without writing.
    fn validate_epic(&self, epic: &NewEpic) -> Result<(), ShortcutError>;

    /// Checks that every name in `story` resolves in this workspace, without writing.
    fn validate_story(&self, story: &NewStory) -> Result<(), ShortcutError>;

    /// Creates an epic.
    async fn create_epic(&self, epic: &NewEpic) -> Result<TargetItem, ShortcutError>;

    /// Creates a story.
    async fn create_story(&self, story: &NewStory) -> Result<TargetItem, ShortcutError>;

    /// Adds a comment to an epic.
    async fn create_epic_comment(
        &self,
        epic_id: u64,
        comment: &NewComment,
    ) -> Result<(), ShortcutError>;

    /// Adds a comment to a story.
    async fn create_story_comment(
        &self,
        story_id: u64,
        comment: &NewComment,
    ) -> Result<(), ShortcutError>;

    /// Applies a partial update to a story.
    async fn update_story(&self, story_id: u64, patch: &StoryPatch) -> Result<(), ShortcutError>;

    /// Applies a partial update to an epic.
    async fn update_epic(&self, epic_id: u64, patch: &EpicPatch) -> Result<(), ShortcutError>;

    /// Returns stories whose external links contain `external_link`.
    async fn find_stories_by_external_link(
        &self,
        external_link: &str,
    ) -> Result<Vec<TargetItem>, ShortcutError>;

    /// Lists all epics in the workspace.
    async fn list_epics(&self) -> Result<Vec<EpicSummary>, ShortcutError>;

    /// Creates an iteration.
    async fn create_iteration(
        &self,
        iteration: &NewIteration,
    ) -> Result<TargetItem, ShortcutError>;
}

/// Shortcut REST API client with cached workspace metadata.
#[derive(Debug)]
pub struct ShortcutClient {
    api: ApiClient,
    metadata: WorkspaceMetadata,
}

impl ShortcutClient {
    /// Connects to a workspace and loads its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ShortcutError`] if the client cannot be built or metadata cannot be loaded.
    pub async fn connect(base_url: &str, token: &str) -> Result<Self, ShortcutError> {
        let api = ApiClient::new("Shortcut", base_url, TOKEN_HEADER, token, RateLimit::SHORTCUT)?;
        let metadata = WorkspaceMetadata::fetch(&api).await?;
        Ok(Self { api, metadata })
    }

    /// Returns the cached workspace metadata.
    #[must_use]
    pub fn metadata(&self) -> &WorkspaceMetadata {
        &self.metadata
    }

    fn labels<'a>(&self, fields: &'a ItemFields) -> Vec<LabelParams<'a>> {
        fields
            .labels
            .iter()
            .inspect(|name| {
                if !self.metadata.has_label(name) {
                    debug!(label = %name, "Label does not exist yet and will be created");
                }
            })
            .map(|name| LabelParams { name })
            .collect()
    }

    fn requester_id(&self, fields: &ItemFields) -> Option<String> {
        fields
            .requested_by
            .as_deref()
            .and_then(|name| self.metadata.member_id(name))
            .map(str::to_string)
    }

    fn comment_body<'a>(&self, comment: &'a NewComment) -> CreateCommentBody<'a> {
        CreateCommentBody {
            text: &comment.text,
            author_id: comment
                .author
                .as_deref()
                .and_then(|name| self.metadata.member_id(name))
                .map(str::to_string),
            created_at: format_timestamp(&comment.created_at),
        }
    }
}

#[async_trait]
impl Workspace for ShortcutClient {
    fn validate_epic(&self, epic: &NewEpic) -> Result<(), ShortcutError> {
        self.metadata.check_epic(epic)
    }

    fn validate_story(&self, story: &NewStory) -> Result<(), ShortcutError> {
        self.metadata.check_story(story)
    }

    async fn create_epic(&self, epic: &NewEpic) -> Result<TargetItem, ShortcutError> {
        let fields = &epic.fields;
        let body = CreateEpicBody {
            name: &fields.name,
            description: &fields.description,
            created_at: format_timestamp(&fields.created_at),
            epic_state_id: self.metadata.epic_state_id(&epic.state)?,
            owner_ids: self.metadata.member_ids(&fields.owners),
            requested_by_id: self.requester_id(fields),
            external_id: &fields.external_id,
            labels: self.labels(fields),
        };

        let record: ItemRecord = self.api.post("epics", &body).await?;
        Ok(TargetItem {
            id: record.id,
            app_url: record.app_url,
            kind: ItemKind::Epic,
        })
    }

    async fn create_story(&self, story: &NewStory) -> Result<TargetItem, ShortcutError> {
        let fields = &story.fields;
        let custom_fields = story
            .custom_fields
            .iter()
            .map(|selection| {
                self.metadata
                    .custom_field_value(&selection.field, &selection.value)
                    .map(|(field_id, value_id)| CustomFieldParams { field_id, value_id })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let body = CreateStoryBody {
            name: &fields.name,
            description: &fields.description,
            created_at: format_timestamp(&fields.created_at),
            workflow_state_id: self.metadata.story_state_id(&story.state)?,
            owner_ids: self.metadata.member_ids(&fields.owners),
            requested_by_id: self.requester_id(fields),
            external_id: &fields.external_id,
            labels: self.labels(fields),
            estimate: story.estimate,
            custom_fields,
            external_links: &story.external_links,
        };

        let record: ItemRecord = self.api.post("stories", &body).await?;
        Ok(TargetItem {
            id: record.id,
            app_url: record.app_url,
            kind: ItemKind::Story,
        })
    }

    async fn create_epic_comment(
        &self,
        epic_id: u64,
        comment: &NewComment,
    ) -> Result<(), ShortcutError> {
        let _: IgnoredAny = self
            .api
            .post(&format!("epics/{epic_id}/comments"), &self.comment_body(comment))
            .await?;
        Ok(())
    }

    async fn create_story_comment(
        &self,
        story_id: u64,
        comment: &NewComment,
    ) -> Result<(), ShortcutError> {
        let _: IgnoredAny = self
            .api
            .post(&format!("stories/{story_id}/comments"), &self.comment_body(comment))
            .await?;
        Ok(())
    }

    async fn update_story(&self, story_id: u64, patch: &StoryPatch) -> Result<(), ShortcutError> {
        let body = UpdateStoryBody {
            archived: patch.archived,
            epic_id: patch.epic_id,
            external_links: patch.external_links.as_deref(),
        };
        let _: IgnoredAny = self.api.put(&format!("stories/{story_id}"), &body).await?;
        Ok(())
    }

    async fn update_epic(&self, epic_id: u64, patch: &EpicPatch) -> Result<(), ShortcutError> {
        let body = UpdateEpicBody {
            archived: patch.archived,
        };
        let _: IgnoredAny = self.api.put(&format!("epics/{epic_id}"), &body).await?;
        Ok(())
    }

    async fn find_stories_by_external_link(
        &self,
        external_link: &str,
    ) -> Result<Vec<TargetItem>, ShortcutError> {
        let records: Vec<ItemRecord> = self
            .api
            .get(
                "external-link/stories",
                &[("external_link", external_link)],
            )
            .await?;

        Ok(records
            .into_iter()
            .map(|record| TargetItem {
                id: record.id,
                app_url: record.app_url,
                kind: ItemKind::Story,
            })
            .collect())
    }

    async fn list_epics(&self) -> Result<Vec<EpicSummary>, ShortcutError> {
        let records: Vec<EpicRecord> = self.api.get("epics", &[]).await?;
        Ok(records
            .into_iter()
            .map(|record| EpicSummary {
                id: record.id,
                name: record.name,
                archived: record.archived,
                updated_at: record.updated_at,
            })
            .collect())
    }

    async fn create_iteration(
        &self,
        iteration: &NewIteration,
    ) -> Result<TargetItem, ShortcutError> {
        let group_ids = match &iteration.team_slug {
            Some(slug) => vec![self.metadata.team_id(slug)?.to_string()],
            None => Vec::new(),
        };

        let body = CreateIterationBody {
            name: &iteration.name,
            start_date: format_date(&iteration.start_date),
            end_date: format_date(&iteration.end_date),
            group_ids,
        };

        let record: ItemRecord = self.api.post("iterations", &body).await?;
        Ok(TargetItem {
            id: record.id,
            app_url: record.app_url,
            kind: ItemKind::Iteration,
        })
    }
}
