//! Workspace metadata fetched once per run.

use super::models::{CustomField, EpicWorkflow, Group, Label, Member, Workflow};
use super::ShortcutError;
use crate::api::ApiClient;
use crate::types::{NewEpic, NewStory};
use std::collections::HashMap;
use tracing::{info, warn};

/// Custom field id plus its enumerated values (value name to value id).
#[derive(Debug, Clone, Default)]
pub struct CustomFieldInfo {
    pub id: String,
    pub values: HashMap<String, String>,
}

/// Name-to-id lookups for a Shortcut workspace.
///
/// Built once when the client connects and never refreshed; changes made in
/// the workspace during a run are not picked up.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceMetadata {
    story_states: HashMap<String, u64>,
    epic_states: HashMap<String, u64>,
    members: HashMap<String, String>,
    labels: HashMap<String, u64>,
    custom_fields: HashMap<String, CustomFieldInfo>,
    teams: HashMap<String, String>,
}

impl WorkspaceMetadata {
    /// Fetches all lookups from the workspace.
    ///
    /// # Errors
    ///
    /// Returns [`ShortcutError`] if any request fails or the workspace has no workflow.
    pub(crate) async fn fetch(api: &ApiClient) -> Result<Self, ShortcutError> {
        let workflows: Vec<Workflow> = api.get("workflows", &[]).await?;
        let epic_workflow: EpicWorkflow = api.get("epic-workflow", &[]).await?;
        let members: Vec<Member> = api.get("members", &[]).await?;
        let labels: Vec<Label> = api.get("labels", &[]).await?;
        let custom_fields: Vec<CustomField> = api.get("custom-fields", &[]).await?;
        let groups: Vec<Group> = api.get("groups", &[]).await?;

        let metadata =
            Self::from_parts(workflows, epic_workflow, members, labels, custom_fields, groups)?;

        info!(
            story_states = metadata.story_states.len(),
            epic_states = metadata.epic_states.len(),
            members = metadata.members.len(),
            labels = metadata.labels.len(),
            custom_fields = metadata.custom_fields.len(),
            teams = metadata.teams.len(),
            "Loaded workspace metadata"
        );
        Ok(metadata)
    }

    pub(crate) fn from_parts(
        workflows: Vec<Workflow>,
        epic_workflow: EpicWorkflow,
        members: Vec<Member>,
        labels: Vec<Label>,
        custom_fields: Vec<CustomField>,
        groups: Vec<Group>,
    ) -> Result<Self, ShortcutError> {
        let mut workflows = workflows.into_iter();
        let workflow = workflows.next().ok_or(ShortcutError::NoWorkflows)?;
        if workflows.next().is_some() {
            warn!(workflow = %workflow.name, "Multiple workflows found; using the first as the default");
        }

        Ok(Self {
            story_states: workflow
                .states
                .into_iter()
                .map(|s| (s.name, s.id))
                .collect(),
            epic_states: epic_workflow
                .epic_states
                .into_iter()
                .map(|s| (s.name, s.id))
                .collect(),
            members: members
                .into_iter()
                .map(|m| (m.profile.mention_name, m.id))
                .collect(),
            labels: labels
                .into_iter()
                .filter(|l| !l.archived)
                .map(|l| (l.name, l.id))
                .collect(),
            custom_fields: custom_fields
                .into_iter()
                .map(|cf| {
                    let values = cf.values.into_iter().map(|v| (v.value, v.id)).collect();
                    (cf.name, CustomFieldInfo { id: cf.id, values })
                })
                .collect(),
            teams: groups
                .into_iter()
                .map(|g| (g.mention_name, g.id))
                .collect(),
        })
    }

    /// Resolves a workflow state name of the default workflow.
    ///
    /// # Errors
    ///
    /// Returns [`ShortcutError::UnknownWorkflowState`] if no state has this name.
    pub fn story_state_id(&self, name: &str) -> Result<u64, ShortcutError> {
        self.story_states
            .get(name)
            .copied()
            .ok_or_else(|| ShortcutError::UnknownWorkflowState {
                name: name.to_string(),
            })
    }

    /// Resolves an epic state name.
    ///
    /// # Errors
    ///
    /// Returns [`ShortcutError::UnknownEpicState`] if no state has this name.
    pub fn epic_state_id(&self, name: &str) -> Result<u64, ShortcutError> {
        self.epic_states
            .get(name)
            .copied()
            .ok_or_else(|| ShortcutError::UnknownEpicState {
                name: name.to_string(),
            })
    }

    /// Resolves a member mention name to the member id.
    #[must_use]
    pub fn member_id(&self, mention_name: &str) -> Option<&str> {
        self.members.get(mention_name).map(String::as_str)
    }

    /// Resolves mention names to member ids, dropping unknown names.
    #[must_use]
    pub fn member_ids(&self, mention_names: &[String]) -> Vec<String> {
        mention_names
            .iter()
            .filter_map(|name| self.member_id(name))
            .map(str::to_string)
            .collect()
    }

    /// Returns true if a non-archived label with this name exists.
    #[must_use]
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    /// Resolves a custom field value to `(field_id, value_id)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the field does not exist or `value` is not one of its values.
    pub fn custom_field_value(
        &self,
        field: &str,
        value: &str,
    ) -> Result<(String, String), ShortcutError> {
        let info = self
            .custom_fields
            .get(field)
            .ok_or_else(|| ShortcutError::UnknownCustomField {
                field: field.to_string(),
            })?;

        let value_id =
            info.values
                .get(value)
                .ok_or_else(|| ShortcutError::UnknownCustomFieldValue {
                    field: field.to_string(),
                    value: value.to_string(),
                })?;

        Ok((info.id.clone(), value_id.clone()))
    }

    /// Checks that the epic's state exists.
    ///
    /// # Errors
    ///
    /// Returns [`ShortcutError::UnknownEpicState`] if it does not.
    pub fn check_epic(&self, epic: &NewEpic) -> Result<(), ShortcutError> {
        self.epic_state_id(&epic.state).map(drop)
    }

    /// Checks that the story's workflow state and custom field values exist.
    ///
    /// # Errors
    ///
    /// Returns the lookup error for the first name that does not resolve.
    pub fn check_story(&self, story: &NewStory) -> Result<(), ShortcutError> {
        self.story_state_id(&story.state)?;
        for selection in &story.custom_fields {
            self.custom_field_value(&selection.field, &selection.value)?;
        }
        Ok(())
    }

    /// Resolves a team (group) mention name to the group id.
    ///
    /// # Errors
    ///
    /// Returns [`ShortcutError::UnknownTeam`] if no team has this mention name.
    pub fn team_id(&self, slug: &str) -> Result<&str, ShortcutError> {
        self.teams
            .get(slug)
            .map(String::as_str)
            .ok_or_else(|| ShortcutError::UnknownTeam {
                slug: slug.to_string(),
            })
    }
}
