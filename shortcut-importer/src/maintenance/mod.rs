//! Workspace housekeeping: archiving epics and creating iterations.

mod error;
mod iterations;

pub use error::MaintenanceError;
pub use iterations::{create_iterations, IterationPlan};

use crate::shortcut::Workspace;
use crate::types::{EpicPatch, EpicSummary};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

/// Default age after which epics are archived.
pub const DEFAULT_ARCHIVE_AGE_DAYS: u32 = 90;

/// Which epics to archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpicSelection {
    /// Exactly these epics.
    Ids(Vec<u64>),

    /// Every non-archived epic not updated in the last `days` days.
    OlderThan { days: u32 },
}

/// Archives the selected epics and returns their ids.
///
/// `now` anchors the age cutoff. In dry-run mode the selection is resolved
/// and logged but nothing is archived.
///
/// # Errors
///
/// Returns [`MaintenanceError`] if listing or updating epics fails.
pub async fn archive_epics(
    workspace: &dyn Workspace,
    selection: &EpicSelection,
    now: DateTime<Utc>,
    dry_run: bool,
) -> Result<Vec<u64>, MaintenanceError> {
    let targets: Vec<(u64, Option<String>)> = match selection {
        EpicSelection::Ids(ids) => {
            info!(count = ids.len(), "Archiving specified epics");
            ids.iter().map(|&id| (id, None)).collect()
        }
        EpicSelection::OlderThan { days } => {
            let cutoff = now - Duration::days(i64::from(*days));
            let stale: Vec<_> = workspace
                .list_epics()
                .await?
                .into_iter()
                .filter(|epic| is_stale(epic, cutoff))
                .map(|epic| (epic.id, Some(epic.name)))
                .collect();
            info!(count = stale.len(), age_days = days, "Archiving stale epics");
            stale
        }
    };

    set_archived(workspace, targets, true, dry_run).await
}

/// Unarchives the given epics and returns their ids.
///
/// # Errors
///
/// Returns [`MaintenanceError`] if an update fails.
pub async fn unarchive_epics(
    workspace: &dyn Workspace,
    ids: &[u64],
    dry_run: bool,
) -> Result<Vec<u64>, MaintenanceError> {
    info!(count = ids.len(), "Unarchiving epics");
    let targets = ids.iter().map(|&id| (id, None)).collect();
    set_archived(workspace, targets, false, dry_run).await
}

fn is_stale(epic: &EpicSummary, cutoff: DateTime<Utc>) -> bool {
    !epic.archived && epic.updated_at < cutoff
}

async fn set_archived(
    workspace: &dyn Workspace,
    targets: Vec<(u64, Option<String>)>,
    archived: bool,
    dry_run: bool,
) -> Result<Vec<u64>, MaintenanceError> {
    let action = if archived { "archive" } else { "unarchive" };
    let patch = EpicPatch {
        archived: Some(archived),
    };

    let mut done = Vec::with_capacity(targets.len());
    for (id, name) in targets {
        let name = name.unwrap_or_default();
        if dry_run {
            info!(epic = id, name = %name, "Would {action} epic");
        } else {
            workspace.update_epic(id, &patch).await?;
            info!(epic = id, name = %name, "Epic {action}d");
        }
        done.push(id);
    }
    Ok(done)
}
