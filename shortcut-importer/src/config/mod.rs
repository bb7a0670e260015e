//! Configuration loading.
//!
//! This module handles parsing `config.toml`, validating it, and resolving
//! API tokens from the file or the environment.

mod error;
mod sections;

pub use error::ConfigError;
pub use sections::{
    default_epic_label, default_iteration_name_format, default_ledger_path,
    default_provenance_format, default_technical_area_field, GitHubSection, ShortcutSection,
    ZenHubSection,
};

use crate::types::IssueState;
use sections::default_true;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
const ZENHUB_TOKEN_ENV: &str = "ZENHUB_TOKEN";
const SHORTCUT_TOKEN_ENV: &str = "SHORTCUT_API_TOKEN";

/// Parsed contents of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ImporterConfig {
    pub github: GitHubSection,

    #[serde(default)]
    pub zenhub: ZenHubSection,

    #[serde(default)]
    pub shortcut: ShortcutSection,

    /// Base path of the migration ledger; the workspace name is appended.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,

    /// Label marking a GitHub issue as an epic.
    #[serde(default = "default_epic_label")]
    pub epic_label: String,

    /// Name of the enumerated custom field that holds the technical area.
    #[serde(default = "default_technical_area_field")]
    pub technical_area_field: String,

    /// Skip issues already present in the ledger (defaults to true).
    #[serde(default = "default_true")]
    pub avoid_duplicates: bool,

    /// Stay quiet about unmapped GitHub users (defaults to true).
    #[serde(default = "default_true")]
    pub strict_users: bool,

    /// GitHub login to Shortcut mention name.
    #[serde(default)]
    pub user_map: HashMap<String, String>,

    /// GitHub issue state (`open`/`closed`) to Shortcut epic state name.
    #[serde(default)]
    pub epic_state_map: HashMap<String, String>,

    /// GitHub issue state (`open`/`closed`) to Shortcut workflow state name.
    #[serde(default)]
    pub issue_state_map: HashMap<String, String>,

    /// Handlebars format for the header prepended to migrated descriptions.
    #[serde(default = "default_provenance_format")]
    pub provenance_format: String,

    /// Handlebars format for iteration names.
    #[serde(default = "default_iteration_name_format")]
    pub iteration_name_format: String,
}

impl ImporterConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unparsable or invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading config");

        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let config = Self::parse(&content, path)?;
        config.validate(path)?;
        Ok(config)
    }

    /// Parses configuration text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TomlError`] if the text is not valid config TOML.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first problem found.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError {
            path: path.display().to_string(),
            message,
        };

        if self.github.org.trim().is_empty() {
            return Err(invalid("github.org must not be empty".to_string()));
        }

        if self.epic_label.trim().is_empty() {
            return Err(invalid("epic-label must not be empty".to_string()));
        }

        if self.ledger_path.trim().is_empty() {
            return Err(invalid("ledger-path must not be empty".to_string()));
        }

        for (name, value) in [
            ("zenhub.api-url", &self.zenhub.api_url),
            ("shortcut.api-url", &self.shortcut.api_url),
        ] {
            if Url::parse(value).is_err() {
                return Err(invalid(format!("{name} is not a valid URL: {value}")));
            }
        }

        for (name, map) in [
            ("epic-state-map", &self.epic_state_map),
            ("issue-state-map", &self.issue_state_map),
        ] {
            let known = [IssueState::Open.as_str(), IssueState::Closed.as_str()];
            if let Some(key) = map.keys().find(|key| !known.contains(&key.as_str())) {
                return Err(invalid(format!(
                    "{name} has unknown GitHub state '{key}' (expected 'open' or 'closed')"
                )));
            }
        }

        Ok(())
    }

    /// Returns the GitHub token from the file or `GITHUB_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] when neither is set.
    pub fn github_token(&self) -> Result<String, ConfigError> {
        token_or_env(self.github.token.as_deref(), "GitHub", GITHUB_TOKEN_ENV)
    }

    /// Returns the ZenHub token from the file or `ZENHUB_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] when neither is set.
    pub fn zenhub_token(&self) -> Result<String, ConfigError> {
        token_or_env(self.zenhub.token.as_deref(), "ZenHub", ZENHUB_TOKEN_ENV)
    }

    /// Returns the Shortcut token for a workspace.
    ///
    /// When `shortcut.tokens` lists any workspace, only those entries are used.
    /// `SHORTCUT_API_TOKEN` applies only when no per-workspace tokens exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownWorkspaceToken`] when the tokens table lacks
    /// the workspace, and [`ConfigError::MissingToken`] when nothing is set.
    pub fn shortcut_token(&self, workspace: &str) -> Result<String, ConfigError> {
        if self.shortcut.tokens.is_empty() {
            return token_or_env(None, "Shortcut", SHORTCUT_TOKEN_ENV);
        }

        self.shortcut
            .tokens
            .get(workspace)
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .ok_or_else(|| ConfigError::UnknownWorkspaceToken {
                workspace: workspace.to_string(),
            })
    }

    /// Resolves the target workspace: the explicit choice, else `shortcut.workspace`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingWorkspace`] when neither is set.
    pub fn workspace(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        explicit
            .or(self.shortcut.workspace.as_deref())
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
            .ok_or(ConfigError::MissingWorkspace)
    }

    /// Returns the ledger file for a workspace.
    ///
    /// Each workspace gets its own file so ids from different workspaces never mix.
    #[must_use]
    pub fn ledger_file(&self, workspace: &str) -> PathBuf {
        crate::ledger::workspace_file(&self.ledger_path, workspace)
    }
}

fn token_or_env(
    configured: Option<&str>,
    service: &'static str,
    env_var: &'static str,
) -> Result<String, ConfigError> {
    if let Some(token) = configured.filter(|t| !t.trim().is_empty()) {
        return Ok(token.to_string());
    }

    std::env::var(env_var)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or(ConfigError::MissingToken { service, env_var })
}
