//! Orchestrates repository imports and epic linking.

mod config;
mod error;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::config::ImporterConfig;
use crate::epics::connect_epics;
use crate::identity::IdentityMapper;
use crate::issues::{
    migrate_issue, MigrationContext, MigrationRequest, MigrationSettings, MigrationStatus,
};
use crate::ledger::Ledger;
use crate::shortcut::{ShortcutClient, Workspace};
use crate::source::{EpicSource, GitHubSource, IssueSource, ZenHubClient};
use crate::summary::{ImportSummary, LinkSummary};
use crate::templates::TemplateRenderer;
use crate::types::SourceIssue;
use tracing::{debug, info};

/// Connects to the Shortcut workspace named `workspace`.
///
/// # Errors
///
/// Returns [`RunnerError`] if no token is configured or the workspace metadata
/// cannot be loaded.
pub async fn connect_workspace(
    config: &ImporterConfig,
    workspace: &str,
) -> Result<ShortcutClient, RunnerError> {
    let token = config.shortcut_token(workspace)?;
    info!(workspace = %workspace, "Connecting to Shortcut");
    Ok(ShortcutClient::connect(&config.shortcut.api_url, &token).await?)
}

/// Splits an `org/repo#N` reference into its parts.
///
/// # Errors
///
/// Returns [`RunnerError::InvalidIssueRef`] if the reference is malformed.
pub fn parse_issue_ref(reference: &str) -> Result<(String, String, u64), RunnerError> {
    let invalid = || RunnerError::InvalidIssueRef {
        reference: reference.to_string(),
    };

    let (path, number) = reference.rsplit_once('#').ok_or_else(invalid)?;
    let (org, repo) = path.split_once('/').ok_or_else(invalid)?;
    let number = number.parse::<u64>().map_err(|_| invalid())?;
    if org.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(invalid());
    }

    Ok((org.to_string(), repo.to_string(), number))
}

/// Migrates issues from GitHub into one Shortcut workspace.
pub struct Importer {
    org: String,
    settings: MigrationSettings,
    workspace: Box<dyn Workspace>,
    source: Box<dyn IssueSource>,
    epics: Option<Box<dyn EpicSource>>,
    ledger: Ledger,
    identities: IdentityMapper,
    renderer: TemplateRenderer,
    dry_run: bool,
}

impl Importer {
    /// Connects to GitHub, Shortcut and (optionally) ZenHub and opens the
    /// workspace's ledger.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if a token is missing, a client cannot be built
    /// or the ledger cannot be opened.
    pub async fn connect(
        config: &ImporterConfig,
        options: &RunnerConfig,
    ) -> Result<Self, RunnerError> {
        let source = GitHubSource::new(config.github_token()?)?;
        let workspace = connect_workspace(config, options.workspace()).await?;

        let epics: Option<Box<dyn EpicSource>> = if options.zenhub() {
            let token = config.zenhub_token()?;
            Some(Box::new(ZenHubClient::new(&config.zenhub.api_url, &token)?))
        } else {
            None
        };

        let ledger_file = config.ledger_file(options.workspace());
        info!(path = %ledger_file.display(), "Opening ledger");
        let ledger = Ledger::open(&ledger_file)?;

        Ok(Self::from_parts(
            config,
            Box::new(workspace),
            Box::new(source),
            epics,
            ledger,
            options.dry_run(),
        ))
    }

    /// Builds an importer from already constructed clients.
    pub fn from_parts(
        config: &ImporterConfig,
        workspace: Box<dyn Workspace>,
        source: Box<dyn IssueSource>,
        epics: Option<Box<dyn EpicSource>>,
        ledger: Ledger,
        dry_run: bool,
    ) -> Self {
        Self {
            org: config.github.org.clone(),
            settings: MigrationSettings::from(config),
            workspace,
            source,
            epics,
            ledger,
            identities: IdentityMapper::new(config.user_map.clone(), config.strict_users),
            renderer: TemplateRenderer::new(),
            dry_run,
        }
    }

    /// Returns the migration ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Migrates every issue of `repo`, oldest first.
    ///
    /// Issues numbered below `starting_issue` are counted but not migrated.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] on the first fatal migration error.
    pub async fn migrate_repo(
        &mut self,
        repo: &str,
        starting_issue: Option<u64>,
        request: &MigrationRequest,
    ) -> Result<ImportSummary, RunnerError> {
        let mut summary = ImportSummary::new(self.dry_run);
        let issues = self.source.list_issues(&self.org, repo).await?;
        info!(repo = %repo, count = issues.len(), labels = ?request.labels, "Importing issues");

        let ctx = MigrationContext {
            workspace: self.workspace.as_ref(),
            source: self.source.as_ref(),
            epics: self.epics.as_deref(),
            identities: &self.identities,
            renderer: &self.renderer,
            settings: &self.settings,
            dry_run: self.dry_run,
        };

        for issue in &issues {
            summary.tally(issue.is_epic(&self.settings.epic_label));

            if starting_issue.is_some_and(|start| issue.key.number < start) {
                debug!(issue = %issue.reference(), "Before starting issue");
                summary.below_start += 1;
                continue;
            }

            let status = migrate_issue(&ctx, &mut self.ledger, issue, request).await?;
            log_status(issue, &status);
            summary.record(&status);
        }

        info!(
            repo = %repo,
            epics = summary.epics,
            stories = summary.stories,
            created = summary.created,
            skipped = summary.skipped,
            "Import finished"
        );
        Ok(summary)
    }

    /// Migrates a single issue addressed as `org/repo#N`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the reference is malformed or migration fails.
    pub async fn migrate_single(
        &mut self,
        reference: &str,
        request: &MigrationRequest,
    ) -> Result<MigrationStatus, RunnerError> {
        let (org, repo, number) = parse_issue_ref(reference)?;
        let issue = self.source.get_issue(&org, &repo, number).await?;

        let ctx = MigrationContext {
            workspace: self.workspace.as_ref(),
            source: self.source.as_ref(),
            epics: self.epics.as_deref(),
            identities: &self.identities,
            renderer: &self.renderer,
            settings: &self.settings,
            dry_run: self.dry_run,
        };

        let status = migrate_issue(&ctx, &mut self.ledger, &issue, request).await?;
        log_status(&issue, &status);
        Ok(status)
    }

    /// Assigns migrated stories of `repo` to their migrated ZenHub epics.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::ZenHubDisabled`] without ZenHub, or any linking error.
    pub async fn connect_epics_from_zenhub(
        &self,
        repo: &str,
    ) -> Result<LinkSummary, RunnerError> {
        let epics = self.epics.as_deref().ok_or(RunnerError::ZenHubDisabled)?;
        let repo_id = self.source.repository_id(&self.org, repo).await?;
        info!(repo = %repo, repo_id, "Connecting ZenHub epics");

        Ok(connect_epics(
            self.workspace.as_ref(),
            epics,
            &self.ledger,
            repo_id,
            self.dry_run,
        )
        .await?)
    }
}

fn log_status(issue: &SourceIssue, status: &MigrationStatus) {
    match status {
        MigrationStatus::Created(item) => info!("{} → {}", issue.reference(), item.app_url),
        MigrationStatus::Planned { kind } => {
            info!("{} → new {kind} (dry run)", issue.reference());
        }
        MigrationStatus::Skipped { reason } => {
            info!(reason = %reason, "Skipped {}", issue.reference());
        }
    }
}
