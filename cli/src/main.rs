//! CLI for the Shortcut importer.
//!
//! Migrates GitHub issues (optionally enriched with ZenHub epics and
//! estimates) into a Shortcut workspace, and performs small workspace
//! maintenance tasks.

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use shortcut_importer::{
    archive_epics, connect_workspace, create_iterations, unarchive_epics, ConfigError,
    EpicSelection, ImportSummary, Importer, ImporterConfig, IterationPlan, LinkSummary,
    MaintenanceError, MigrationRequest, MigrationStatus, RunnerConfig, RunnerError,
    TemplateRenderer, DEFAULT_ARCHIVE_AGE_DAYS,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Shortcut Importer - Migrate GitHub issues into Shortcut stories and epics.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, short = 'c', default_value = "config.toml", global = true)]
    config_file: PathBuf,

    /// Shortcut workspace to operate on (defaults to shortcut.workspace).
    #[arg(long, short = 'w', env = "SHORTCUT_WORKSPACE", global = true)]
    workspace: Option<String>,

    /// Preview changes without writing to Shortcut or the ledger.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import every issue of a repository.
    ImportFromGithub {
        /// Repository name (within github.org).
        repo: String,

        /// Skip issues numbered below this one.
        #[arg(long, short = 's')]
        starting_issue: Option<u64>,

        #[command(flatten)]
        extras: ImportArgs,
    },

    /// Import a single issue, addressed as org/repo#N.
    ImportIssue {
        /// Issue reference, e.g. acme/api#42.
        issue: String,

        #[command(flatten)]
        extras: ImportArgs,
    },

    /// Assign already migrated stories to their migrated ZenHub epics.
    ConnectZenhubEpics {
        /// Repository name (within github.org).
        repo: String,
    },

    /// Archive the given epics, or every epic not updated for --age days.
    ArchiveEpics {
        /// Age in days after which unarchived epics are archived.
        #[arg(long, short = 'a', default_value_t = DEFAULT_ARCHIVE_AGE_DAYS)]
        age: u32,

        /// Epic ids to archive (overrides --age).
        epics: Vec<u64>,
    },

    /// Unarchive the given epics.
    UnarchiveEpics {
        /// Epic ids to unarchive.
        #[arg(required = true)]
        epics: Vec<u64>,
    },

    /// Create a run of equally spaced iterations.
    CreateIterations {
        /// Start date of the first iteration (YYYY-MM-DD).
        #[arg(long, short = 's')]
        start_date: NaiveDate,

        /// Length of each iteration in days.
        #[arg(long, short = 'd', default_value_t = IterationPlan::DEFAULT_DURATION_DAYS)]
        duration: u32,

        /// Days between iteration starts.
        #[arg(long, short = 'p', default_value_t = IterationPlan::DEFAULT_PERIOD_DAYS)]
        period: u32,

        /// Number of iterations to create.
        #[arg(long, short = 'n', default_value_t = 1)]
        n_iterations: u32,

        /// Team mention name (not display name).
        #[arg(long, short = 't')]
        team_slug: Option<String>,
    },
}

/// Options shared by the import commands.
#[derive(Args, Debug)]
struct ImportArgs {
    /// Read epics and estimates from ZenHub.
    #[arg(long, short = 'z')]
    zenhub: bool,

    /// Value of the technical area custom field for created stories.
    #[arg(long, short = 't')]
    technical_area: Option<String>,

    /// Labels to add to created items (repeatable, comma separated).
    #[arg(long, short = 'l', action = clap::ArgAction::Append, value_delimiter = ',')]
    labels: Vec<String>,
}

impl ImportArgs {
    fn request(&self) -> MigrationRequest {
        MigrationRequest {
            technical_area: self.technical_area.clone(),
            labels: self.labels.clone(),
        }
    }
}

/// Errors surfaced by the CLI, split by exit code.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Maintenance(#[from] MaintenanceError),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Runner(e.into())
    }
}

impl CliError {
    /// Configuration and usage problems exit with 2, everything else with 1.
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Runner(RunnerError::Config(_) | RunnerError::InvalidIssueRef { .. })
            | Self::Maintenance(MaintenanceError::InvalidPlan { .. }) => ExitCode::from(2),
            _ => ExitCode::from(1),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Failed");
            e.exit_code()
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG`, falling back to the `-v` level
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

/// Main execution logic.
async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ImporterConfig::load(&cli.config_file)?;
    let workspace = config.workspace(cli.workspace.as_deref())?;

    match cli.command {
        Command::ImportFromGithub {
            repo,
            starting_issue,
            extras,
        } => {
            let options = RunnerConfig::new(&workspace, cli.dry_run, extras.zenhub);
            let mut importer = Importer::connect(&config, &options).await?;
            let summary = importer
                .migrate_repo(&repo, starting_issue, &extras.request())
                .await?;
            print_import_summary(&summary);
        }
        Command::ImportIssue { issue, extras } => {
            let options = RunnerConfig::new(&workspace, cli.dry_run, extras.zenhub);
            let mut importer = Importer::connect(&config, &options).await?;
            let status = importer.migrate_single(&issue, &extras.request()).await?;
            print_status(&issue, &status);
        }
        Command::ConnectZenhubEpics { repo } => {
            let options = RunnerConfig::new(&workspace, cli.dry_run, true);
            let importer = Importer::connect(&config, &options).await?;
            let summary = importer.connect_epics_from_zenhub(&repo).await?;
            print_link_summary(&summary, cli.dry_run);
        }
        Command::ArchiveEpics { age, epics } => {
            let client = connect_workspace(&config, &workspace).await?;
            let selection = if epics.is_empty() {
                EpicSelection::OlderThan { days: age }
            } else {
                EpicSelection::Ids(epics)
            };
            let archived = archive_epics(&client, &selection, Utc::now(), cli.dry_run).await?;
            print_count("Epics archived", archived.len(), cli.dry_run);
        }
        Command::UnarchiveEpics { epics } => {
            let client = connect_workspace(&config, &workspace).await?;
            let restored = unarchive_epics(&client, &epics, cli.dry_run).await?;
            print_count("Epics unarchived", restored.len(), cli.dry_run);
        }
        Command::CreateIterations {
            start_date,
            duration,
            period,
            n_iterations,
            team_slug,
        } => {
            let plan = IterationPlan {
                start: start_date,
                duration_days: duration,
                period_days: period,
                count: n_iterations,
                team_slug,
            };
            plan.validate()?;

            let client = connect_workspace(&config, &workspace).await?;
            let created = create_iterations(
                &client,
                &TemplateRenderer::new(),
                &config.iteration_name_format,
                &plan,
                cli.dry_run,
            )
            .await?;
            for item in &created {
                println!("  {}", item.app_url);
            }
            print_count("Iterations created", created.len(), cli.dry_run);
        }
    }

    Ok(())
}

/// Prints the summary of a repository import.
fn print_import_summary(summary: &ImportSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Epics: {}", summary.epics);
    println!("  Stories: {}", summary.stories);
    println!("  Before starting issue: {}", summary.below_start);
    println!("  Skipped (already migrated): {}", summary.skipped);

    if summary.dry_run {
        println!("  Would create: {}", summary.planned);
    } else {
        println!("  Created: {}", summary.created);
    }
}

fn print_status(reference: &str, status: &MigrationStatus) {
    match status {
        MigrationStatus::Created(item) => println!("{reference} → {}", item.app_url),
        MigrationStatus::Planned { kind } => println!("{reference} → new {kind} (dry run)"),
        MigrationStatus::Skipped { reason } => println!("{reference} skipped: {reason}"),
    }
}

fn print_link_summary(summary: &LinkSummary, dry_run: bool) {
    println!("\nSummary:");
    if dry_run {
        println!("  Would link: {}", summary.planned);
    } else {
        println!("  Linked: {}", summary.linked);
    }
    println!("  Epics not migrated: {}", summary.epics_skipped);
    println!("  Children not migrated: {}", summary.children_skipped);
    println!("  Stories missing from workspace: {}", summary.missing_targets);
}

fn print_count(label: &str, count: usize, dry_run: bool) {
    let suffix = if dry_run { " (dry run)" } else { "" };
    println!("{label}: {count}{suffix}");
}
