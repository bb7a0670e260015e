#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod api;
pub mod config;
pub mod epics;
pub mod identity;
pub mod issues;
pub mod ledger;
pub mod maintenance;
pub mod rate_limit;
pub mod runner;
pub mod shortcut;
pub mod source;
pub mod summary;
pub mod templates;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::{ApiClient, ApiError};
pub use config::{ConfigError, ImporterConfig};
pub use epics::connect_epics;
pub use identity::IdentityMapper;
pub use issues::{
    migrate_issue, MigrationContext, MigrationError, MigrationRequest, MigrationSettings,
    MigrationStatus,
};
pub use ledger::{Ledger, LedgerError};
pub use maintenance::{
    archive_epics, create_iterations, unarchive_epics, EpicSelection, IterationPlan,
    MaintenanceError, DEFAULT_ARCHIVE_AGE_DAYS,
};
pub use rate_limit::{
    check_core_rate_limit, ensure_core_rate_limit, wait_if_needed, RateLimit, RateLimitInfo,
    SlidingWindow,
};
pub use runner::{connect_workspace, parse_issue_ref, Importer, RunnerConfig, RunnerError};
pub use shortcut::{ShortcutClient, ShortcutError, Workspace, WorkspaceMetadata};
pub use source::{EpicSource, GitHubSource, IssueSource, SourceError, ZenHubClient};
pub use summary::{ImportSummary, LinkSummary};
pub use templates::{create_handlebars_registry, TemplateError, TemplateRenderer};
pub use types::{IssueKey, IssueState, ItemKind, SourceComment, SourceIssue, TargetItem};
