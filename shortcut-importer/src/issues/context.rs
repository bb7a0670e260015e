//! Inputs shared by every issue migration in a run.

use crate::config::{
    default_epic_label, default_provenance_format, default_technical_area_field, ImporterConfig,
};
use crate::identity::IdentityMapper;
use crate::shortcut::Workspace;
use crate::source::{EpicSource, IssueSource};
use crate::templates::TemplateRenderer;
use crate::types::IssueState;
use std::collections::HashMap;

/// Migration settings taken from the configuration file.
#[derive(Debug, Clone)]
pub struct MigrationSettings {
    pub epic_label: String,
    pub technical_area_field: String,
    pub avoid_duplicates: bool,
    pub epic_state_map: HashMap<String, String>,
    pub issue_state_map: HashMap<String, String>,
    pub provenance_format: String,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            epic_label: default_epic_label(),
            technical_area_field: default_technical_area_field(),
            avoid_duplicates: true,
            epic_state_map: HashMap::new(),
            issue_state_map: HashMap::new(),
            provenance_format: default_provenance_format(),
        }
    }
}

impl From<&ImporterConfig> for MigrationSettings {
    fn from(config: &ImporterConfig) -> Self {
        Self {
            epic_label: config.epic_label.clone(),
            technical_area_field: config.technical_area_field.clone(),
            avoid_duplicates: config.avoid_duplicates,
            epic_state_map: config.epic_state_map.clone(),
            issue_state_map: config.issue_state_map.clone(),
            provenance_format: config.provenance_format.clone(),
        }
    }
}

impl MigrationSettings {
    /// Target epic state name for a GitHub state.
    pub(crate) fn epic_state(&self, state: IssueState) -> Option<&str> {
        self.epic_state_map.get(state.as_str()).map(String::as_str)
    }

    /// Target workflow state name for a GitHub state.
    pub(crate) fn story_state(&self, state: IssueState) -> Option<&str> {
        self.issue_state_map.get(state.as_str()).map(String::as_str)
    }
}

/// Caller-supplied extras for the items being created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationRequest {
    /// Value of the technical area custom field (stories only).
    pub technical_area: Option<String>,

    /// Labels added to every created item.
    pub labels: Vec<String>,
}

/// Clients and settings borrowed for the duration of a migration.
#[derive(Clone, Copy)]
pub struct MigrationContext<'a> {
    pub workspace: &'a dyn Workspace,
    pub source: &'a dyn IssueSource,

    /// When present, story estimates are read from here.
    pub epics: Option<&'a dyn EpicSource>,

    pub identities: &'a IdentityMapper,
    pub renderer: &'a TemplateRenderer,
    pub settings: &'a MigrationSettings,
    pub dry_run: bool,
}
