//! Links migrated stories to their migrated epics.
//!
//! Epic membership lives in ZenHub, so it can only be applied once both the
//! epic and its children have been migrated. The ledger supplies the target
//! ids for both sides.

use crate::issues::MigrationError;
use crate::ledger::Ledger;
use crate::shortcut::Workspace;
use crate::source::EpicSource;
use crate::summary::LinkSummary;
use crate::types::StoryPatch;
use tracing::{debug, info, info_span, warn, Instrument};

/// Assigns every migrated child story of every ZenHub epic of `repo_id` to its epic.
///
/// Epics or children that were never migrated are logged and skipped. A child
/// story that no longer exists in the workspace is logged and skipped.
///
/// # Errors
///
/// Returns [`MigrationError`] if reading epics fails, the ledger fails, or the
/// workspace rejects an update for a reason other than a missing story.
pub async fn connect_epics(
    workspace: &dyn Workspace,
    epics: &dyn EpicSource,
    ledger: &Ledger,
    repo_id: u64,
    dry_run: bool,
) -> Result<LinkSummary, MigrationError> {
    let mut summary = LinkSummary::default();

    for epic in epics.epics(repo_id).await? {
        let span = info_span!("connect_epic", epic = %epic);

        async {
            let Some(epic_id) = ledger.get(&epic)? else {
                warn!("Epic was never migrated; skipping its children");
                summary.epics_skipped += 1;
                return Ok(());
            };

            for child in epics.epic_children(repo_id, epic.number).await? {
                let Some(story_id) = ledger.get(&child)? else {
                    warn!(child = %child, "Child issue was never migrated");
                    summary.children_skipped += 1;
                    continue;
                };

                if dry_run {
                    info!(story = story_id, epic = epic_id, "Would link story to epic");
                    summary.planned += 1;
                    continue;
                }

                let patch = StoryPatch {
                    epic_id: Some(epic_id),
                    ..StoryPatch::default()
                };
                match workspace.update_story(story_id, &patch).await {
                    Ok(()) => {
                        debug!(story = story_id, epic = epic_id, "Linked story to epic");
                        summary.linked += 1;
                    }
                    Err(e) if e.is_not_found() => {
                        warn!(story = story_id, "Story no longer exists in the workspace");
                        summary.missing_targets += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            Ok::<(), MigrationError>(())
        }
        .instrument(span)
        .await?;
    }

    info!(
        linked = summary.linked,
        epics_skipped = summary.epics_skipped,
        children_skipped = summary.children_skipped,
        missing = summary.missing_targets,
        "Connected epics"
    );
    Ok(summary)
}
