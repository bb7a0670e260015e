//! Per-service sections of `config.toml`.

use serde::Deserialize;
use std::collections::HashMap;

/// `[github]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubSection {
    /// Organization (or user) that owns the repositories to import.
    pub org: String,

    /// Personal access token (optional, falls back to GITHUB_TOKEN env var).
    pub token: Option<String>,
}

/// `[zenhub]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ZenHubSection {
    /// API token (optional, falls back to ZENHUB_TOKEN env var).
    pub token: Option<String>,

    /// Base URL of the ZenHub REST API.
    #[serde(default = "default_zenhub_api_url")]
    pub api_url: String,
}

impl Default for ZenHubSection {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_zenhub_api_url(),
        }
    }
}

/// `[shortcut]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShortcutSection {
    /// Workspace used when none is given on the command line.
    pub workspace: Option<String>,

    /// API tokens keyed by workspace name.
    #[serde(default)]
    pub tokens: HashMap<String, String>,

    /// Base URL of the Shortcut REST API.
    #[serde(default = "default_shortcut_api_url")]
    pub api_url: String,
}

impl Default for ShortcutSection {
    fn default() -> Self {
        Self {
            workspace: None,
            tokens: HashMap::new(),
            api_url: default_shortcut_api_url(),
        }
    }
}

pub(crate) fn default_zenhub_api_url() -> String {
    "https://api.zenhub.com/p1/".to_string()
}

pub(crate) fn default_shortcut_api_url() -> String {
    "https://api.app.shortcut.com/api/v3/".to_string()
}

/// Returns the default ledger base path.
#[must_use]
pub fn default_ledger_path() -> String {
    "migrated".to_string()
}

/// Returns the default epic label.
#[must_use]
pub fn default_epic_label() -> String {
    "Epic".to_string()
}

/// Returns the default name of the technical area custom field.
#[must_use]
pub fn default_technical_area_field() -> String {
    "Technical Area".to_string()
}

/// Returns the default Handlebars format of the provenance header.
#[must_use]
pub fn default_provenance_format() -> String {
    "Migrated from GitHub [{{org}}/{{repo}}#{{number}}]({{url}})".to_string()
}

/// Returns the default Handlebars format of iteration names.
#[must_use]
pub fn default_iteration_name_format() -> String {
    "{{start}} - {{end}}".to_string()
}

pub(crate) fn default_true() -> bool {
    true
}
