//! Runner error types.

/// Errors that can occur while running an import.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Shortcut client initialization errors.
    #[error(transparent)]
    Workspace(#[from] crate::shortcut::ShortcutError),

    /// GitHub or ZenHub client errors.
    #[error(transparent)]
    Source(#[from] crate::source::SourceError),

    /// Ledger errors.
    #[error(transparent)]
    Ledger(#[from] crate::ledger::LedgerError),

    /// Issue migration or epic linking errors.
    #[error(transparent)]
    Migration(#[from] crate::issues::MigrationError),

    /// The issue reference is not of the form `org/repo#N`.
    #[error("Invalid issue reference '{reference}' (expected org/repo#N)")]
    InvalidIssueRef { reference: String },

    /// Epic linking was requested without ZenHub enabled.
    #[error("Connecting epics requires ZenHub to be enabled")]
    ZenHubDisabled,
}
