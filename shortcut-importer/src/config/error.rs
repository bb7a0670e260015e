//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading the importer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse config in '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Validation error in the configuration.
    #[error("Validation error in '{path}': {message}")]
    ValidationError { path: String, message: String },

    /// Missing required file.
    #[error("Missing required file: {path}")]
    MissingFile { path: String },

    /// No token configured for a service, neither in the file nor the environment.
    #[error("No {service} token configured (set it in the config file or {env_var})")]
    MissingToken {
        service: &'static str,
        env_var: &'static str,
    },

    /// `shortcut.tokens` is configured but has no entry for the workspace.
    #[error("No Shortcut token configured for workspace '{workspace}' in shortcut.tokens")]
    UnknownWorkspaceToken { workspace: String },

    /// No workspace chosen on the command line or in `shortcut.workspace`.
    #[error("No Shortcut workspace selected (pass --workspace or set shortcut.workspace)")]
    MissingWorkspace,
}
