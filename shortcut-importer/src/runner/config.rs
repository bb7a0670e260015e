//! Runner configuration.

/// Per-invocation options that are not part of the configuration file.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Shortcut workspace to import into.
    workspace: String,
    /// Whether to preview changes without writing anything.
    dry_run: bool,
    /// Whether to read epics and estimates from ZenHub.
    zenhub: bool,
}

impl RunnerConfig {
    /// Creates the options for a run.
    pub fn new(workspace: impl Into<String>, dry_run: bool, zenhub: bool) -> Self {
        Self {
            workspace: workspace.into(),
            dry_run,
            zenhub,
        }
    }

    /// Returns the target workspace name.
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns whether ZenHub enrichment is enabled.
    pub fn zenhub(&self) -> bool {
        self.zenhub
    }
}
