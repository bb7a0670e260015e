//! Issue to story/epic migration.
//!
//! This module turns one GitHub issue into a Shortcut epic or story, including
//! duplicate detection against the workspace and the ledger, and copies the
//! issue's comments over.

mod context;
mod error;
mod status;

pub use context::{MigrationContext, MigrationRequest, MigrationSettings};
pub use error::MigrationError;
pub use status::MigrationStatus;

use crate::ledger::Ledger;
use crate::templates::DESCRIPTION_SEPARATOR;
use crate::types::{
    CustomFieldSelection, ItemFields, ItemKind, NewComment, NewEpic, NewStory, SourceComment,
    SourceIssue, StoryPatch, TargetItem,
};
use tracing::{debug, info, info_span, warn, Instrument};

/// Migrates a single issue.
///
/// This function:
/// 1. Skips the issue if a story already links to it
/// 2. Skips the issue if the ledger has it, refreshing the story's external link
/// 3. Creates an epic (issue has the epic label) or a story, then its comments
/// 4. Records the new item in the ledger
///
/// In dry-run mode the duplicate checks and the state and custom field name
/// checks run but nothing is written; the result is [`MigrationStatus::Planned`].
///
/// # Errors
///
/// Returns [`MigrationError`] if a state has no mapping, a state or technical
/// area is unknown to the workspace, or a remote call or the ledger fails. A missing story during the external link refresh is
/// logged and ignored.
pub async fn migrate_issue(
    ctx: &MigrationContext<'_>,
    ledger: &mut Ledger,
    issue: &SourceIssue,
    request: &MigrationRequest,
) -> Result<MigrationStatus, MigrationError> {
    let span = info_span!("migrate_issue", issue = %issue.reference());

    async {
        let linked = ctx.workspace.find_stories_by_external_link(&issue.url).await?;
        if let Some(existing) = linked.first() {
            debug!(story = existing.id, "Story already links to this issue");
            return Ok(MigrationStatus::Skipped {
                reason: format!("story {} already links to this issue", existing.id),
            });
        }

        let kind = if issue.is_epic(&ctx.settings.epic_label) {
            ItemKind::Epic
        } else {
            ItemKind::Story
        };

        let previous = ledger.get(&issue.key)?;
        if let Some(target_id) = previous {
            if ctx.settings.avoid_duplicates {
                if kind == ItemKind::Story {
                    refresh_external_link(ctx, target_id, issue).await?;
                }
                return Ok(MigrationStatus::Skipped {
                    reason: format!("already migrated as {kind} {target_id}"),
                });
            }
            debug!(
                previous = target_id,
                "Already migrated; creating again because duplicates are allowed"
            );
        }

        let fields = item_fields(ctx, issue, request)?;
        let item = match kind {
            ItemKind::Epic => {
                let epic = NewEpic {
                    fields,
                    state: ctx
                        .settings
                        .epic_state(issue.state)
                        .ok_or(MigrationError::MissingStateMapping {
                            map: "epic-state-map",
                            state: issue.state,
                        })?
                        .to_string(),
                };
                ctx.workspace.validate_epic(&epic)?;
                if ctx.dry_run {
                    return Ok(MigrationStatus::Planned { kind });
                }
                create_epic(ctx, issue, &epic).await?
            }
            _ => {
                let story = new_story(ctx, issue, request, fields).await?;
                ctx.workspace.validate_story(&story)?;
                if ctx.dry_run {
                    return Ok(MigrationStatus::Planned { kind });
                }
                create_story(ctx, issue, &story).await?
            }
        };

        if previous.is_some() {
            ledger.replace(&issue.key, item.id)?;
        } else {
            ledger.record(&issue.key, item.id)?;
        }

        info!(id = item.id, kind = %item.kind, "Migrated");
        Ok(MigrationStatus::Created(item))
    }
    .instrument(span)
    .await
}

/// Points an already migrated story back at its source issue.
async fn refresh_external_link(
    ctx: &MigrationContext<'_>,
    story_id: u64,
    issue: &SourceIssue,
) -> Result<(), MigrationError> {
    if ctx.dry_run {
        debug!(story = story_id, "Would refresh external link");
        return Ok(());
    }

    let patch = StoryPatch {
        external_links: Some(vec![issue.url.clone()]),
        ..StoryPatch::default()
    };

    match ctx.workspace.update_story(story_id, &patch).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => {
            warn!(story = story_id, "Ledger points at a story that no longer exists");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn item_fields(
    ctx: &MigrationContext<'_>,
    issue: &SourceIssue,
    request: &MigrationRequest,
) -> Result<ItemFields, MigrationError> {
    let header = ctx
        .renderer
        .render_provenance(&ctx.settings.provenance_format, issue)?;

    Ok(ItemFields {
        name: issue.title.clone(),
        description: format!(
            "{header}{DESCRIPTION_SEPARATOR}{}",
            issue.body.as_deref().unwrap_or_default()
        ),
        created_at: issue.created_at,
        owners: ctx.identities.map_all(&issue.assignees),
        requested_by: ctx.identities.map_username(&issue.author),
        external_id: issue.url.clone(),
        labels: request.labels.clone(),
    })
}

async fn new_story(
    ctx: &MigrationContext<'_>,
    issue: &SourceIssue,
    request: &MigrationRequest,
    fields: ItemFields,
) -> Result<NewStory, MigrationError> {
    let state = ctx
        .settings
        .story_state(issue.state)
        .ok_or(MigrationError::MissingStateMapping {
            map: "issue-state-map",
            state: issue.state,
        })?
        .to_string();

    let estimate = match ctx.epics {
        Some(epics) => epics.estimate(issue.key).await?.map(round_estimate),
        None => None,
    };

    let custom_fields = request
        .technical_area
        .iter()
        .map(|value| CustomFieldSelection {
            field: ctx.settings.technical_area_field.clone(),
            value: value.clone(),
        })
        .collect();

    Ok(NewStory {
        fields,
        state,
        estimate,
        custom_fields,
        external_links: vec![issue.url.clone()],
    })
}

#[allow(clippy::cast_possible_truncation)]
fn round_estimate(value: f64) -> i64 {
    value.round() as i64
}

async fn create_epic(
    ctx: &MigrationContext<'_>,
    issue: &SourceIssue,
    epic: &NewEpic,
) -> Result<TargetItem, MigrationError> {
    let comments = ctx.source.comments(issue).await?;
    let item = ctx.workspace.create_epic(epic).await?;
    for comment in &comments {
        ctx.workspace
            .create_epic_comment(item.id, &new_comment(ctx, comment))
            .await?;
    }
    Ok(item)
}

async fn create_story(
    ctx: &MigrationContext<'_>,
    issue: &SourceIssue,
    story: &NewStory,
) -> Result<TargetItem, MigrationError> {
    let comments = ctx.source.comments(issue).await?;
    let item = ctx.workspace.create_story(story).await?;
    for comment in &comments {
        ctx.workspace
            .create_story_comment(item.id, &new_comment(ctx, comment))
            .await?;
    }
    Ok(item)
}

fn new_comment(ctx: &MigrationContext<'_>, comment: &SourceComment) -> NewComment {
    NewComment {
        text: comment.body.clone(),
        author: ctx.identities.map_username(&comment.author),
        created_at: comment.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::ShortcutError;
    use crate::test_utils::{sample_comment, sample_issue, Harness, WorkspaceCall};
    use crate::types::{IssueKey, IssueState};
    use chrono::{TimeZone, Utc};

    fn request() -> MigrationRequest {
        MigrationRequest {
            technical_area: Some("API".to_string()),
            labels: vec!["migrated".to_string()],
        }
    }

    #[tokio::test]
    async fn creates_story_with_provenance_and_comments() {
        let mut harness = Harness::new();
        let issue = sample_issue(42);
        harness
            .source
            .add_comments(42, vec![sample_comment("alice", "First!")]);
        let mut ledger = Ledger::open_in_memory().unwrap();

        let status = migrate_issue(&harness.context(false), &mut ledger, &issue, &request())
            .await
            .unwrap();

        let MigrationStatus::Created(item) = &status else {
            panic!("expected a created story, got {status:?}");
        };
        assert_eq!(item.kind, ItemKind::Story);
        assert_eq!(ledger.get(&issue.key).unwrap(), Some(item.id));

        let calls = harness.workspace.calls();
        assert_eq!(calls.len(), 2);

        let WorkspaceCall::CreateStory(story) = &calls[0] else {
            panic!("expected create_story first, got {:?}", calls[0]);
        };
        assert!(story.fields.description.starts_with(
            "Migrated from GitHub [org/repo#42](https://github.com/org/repo/issues/42)\n\n---\n\n"
        ));
        assert!(story.fields.description.ends_with("Body of issue 42"));
        assert_eq!(story.external_links, vec![issue.url.clone()]);
        assert_eq!(story.fields.external_id, issue.url);
        assert_eq!(story.state, "Unscheduled");
        assert_eq!(story.fields.owners, vec!["alice.sc"]);
        assert_eq!(story.fields.requested_by.as_deref(), Some("alice.sc"));
        assert_eq!(story.fields.labels, vec!["migrated"]);
        assert_eq!(
            story.custom_fields,
            vec![CustomFieldSelection {
                field: "Technical Area".to_string(),
                value: "API".to_string(),
            }]
        );

        let WorkspaceCall::StoryComment(story_id, comment) = &calls[1] else {
            panic!("expected a story comment, got {:?}", calls[1]);
        };
        assert_eq!(*story_id, item.id);
        assert_eq!(comment.text, "First!");
        assert_eq!(comment.author.as_deref(), Some("alice.sc"));
    }

    #[tokio::test]
    async fn creates_epic_for_labelled_issue() {
        let harness = Harness::new();
        let mut issue = sample_issue(10);
        issue.labels.push("Epic".to_string());
        issue.state = IssueState::Closed;
        let mut ledger = Ledger::open_in_memory().unwrap();

        let status = migrate_issue(
            &harness.context(false),
            &mut ledger,
            &issue,
            &MigrationRequest::default(),
        )
        .await
        .unwrap();

        assert!(matches!(&status, MigrationStatus::Created(item) if item.kind == ItemKind::Epic));
        let calls = harness.workspace.calls();
        let WorkspaceCall::CreateEpic(epic) = &calls[0] else {
            panic!("expected create_epic, got {:?}", calls[0]);
        };
        assert_eq!(epic.state, "done");
    }

    #[tokio::test]
    async fn epic_comments_follow_in_source_order() {
        let mut harness = Harness::new();
        let mut issue = sample_issue(20);
        issue.labels.push("Epic".to_string());
        let mut first = sample_comment("alice", "Kicking this off");
        first.created_at = Utc.with_ymd_and_hms(2021, 3, 1, 9, 0, 0).unwrap();
        let mut second = sample_comment("bob", "Scoped it down");
        second.created_at = Utc.with_ymd_and_hms(2021, 3, 2, 17, 30, 0).unwrap();
        harness
            .source
            .add_comments(20, vec![first.clone(), second.clone()]);
        let mut ledger = Ledger::open_in_memory().unwrap();

        let status = migrate_issue(
            &harness.context(false),
            &mut ledger,
            &issue,
            &MigrationRequest::default(),
        )
        .await
        .unwrap();

        let MigrationStatus::Created(item) = &status else {
            panic!("expected a created epic, got {status:?}");
        };
        let calls = harness.workspace.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[0], WorkspaceCall::CreateEpic(_)));
        assert_eq!(
            calls[1..],
            [
                WorkspaceCall::EpicComment(
                    item.id,
                    NewComment {
                        text: "Kicking this off".to_string(),
                        author: Some("alice.sc".to_string()),
                        created_at: first.created_at,
                    }
                ),
                WorkspaceCall::EpicComment(
                    item.id,
                    NewComment {
                        text: "Scoped it down".to_string(),
                        author: Some("bob.sc".to_string()),
                        created_at: second.created_at,
                    }
                ),
            ]
        );
    }

    #[tokio::test]
    async fn story_comments_follow_in_source_order() {
        let mut harness = Harness::new();
        let issue = sample_issue(21);
        harness.source.add_comments(
            21,
            vec![
                sample_comment("bob", "one"),
                sample_comment("mallory", "two"),
                sample_comment("alice", "three"),
            ],
        );
        let mut ledger = Ledger::open_in_memory().unwrap();

        migrate_issue(&harness.context(false), &mut ledger, &issue, &request())
            .await
            .unwrap();

        let comments: Vec<_> = harness
            .workspace
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                WorkspaceCall::StoryComment(_, comment) => Some((comment.text, comment.author)),
                _ => None,
            })
            .collect();
        assert_eq!(
            comments,
            vec![
                ("one".to_string(), Some("bob.sc".to_string())),
                ("two".to_string(), None),
                ("three".to_string(), Some("alice.sc".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn second_run_creates_nothing() {
        let harness = Harness::new();
        let issue = sample_issue(42);
        let mut ledger = Ledger::open_in_memory().unwrap();
        let ctx = harness.context(false);

        migrate_issue(&ctx, &mut ledger, &issue, &request())
            .await
            .unwrap();
        let creates = harness.workspace.creates();

        let status = migrate_issue(&ctx, &mut ledger, &issue, &request())
            .await
            .unwrap();

        assert!(status.is_skipped());
        assert_eq!(harness.workspace.creates(), creates);
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn external_link_hit_overrides_ledger() {
        let harness = Harness::new();
        let issue = sample_issue(5);
        harness.workspace.link_existing_story(&issue.url, 900);
        let mut ledger = Ledger::open_in_memory().unwrap();

        let status = migrate_issue(&harness.context(false), &mut ledger, &issue, &request())
            .await
            .unwrap();

        assert!(status.is_skipped());
        assert!(harness.workspace.calls().is_empty());
        assert!(ledger.is_empty().unwrap());
    }

    #[tokio::test]
    async fn ledger_hit_refreshes_external_link() {
        let harness = Harness::new();
        let issue = sample_issue(6);
        let mut ledger = Ledger::open_in_memory().unwrap();
        ledger.record(&issue.key, 77).unwrap();

        let status = migrate_issue(&harness.context(false), &mut ledger, &issue, &request())
            .await
            .unwrap();

        assert!(status.is_skipped());
        assert_eq!(
            harness.workspace.calls(),
            vec![WorkspaceCall::UpdateStory(
                77,
                StoryPatch {
                    external_links: Some(vec![issue.url.clone()]),
                    ..StoryPatch::default()
                }
            )]
        );
    }

    #[tokio::test]
    async fn missing_story_during_refresh_is_tolerated() {
        let harness = Harness::new();
        harness.workspace.mark_missing(77);
        let issue = sample_issue(6);
        let mut ledger = Ledger::open_in_memory().unwrap();
        ledger.record(&issue.key, 77).unwrap();

        let status = migrate_issue(&harness.context(false), &mut ledger, &issue, &request())
            .await
            .unwrap();

        assert!(status.is_skipped());
        assert_eq!(ledger.get(&issue.key).unwrap(), Some(77));
    }

    #[tokio::test]
    async fn rejected_refresh_is_an_error() {
        let harness = Harness::new();
        harness.workspace.mark_rejected(77);
        let issue = sample_issue(6);
        let mut ledger = Ledger::open_in_memory().unwrap();
        ledger.record(&issue.key, 77).unwrap();

        let result = migrate_issue(&harness.context(false), &mut ledger, &issue, &request()).await;

        let Err(MigrationError::Workspace(e)) = &result else {
            panic!("expected a workspace error, got {result:?}");
        };
        assert!(!e.is_not_found());
        assert_eq!(ledger.get(&issue.key).unwrap(), Some(77));
        assert_eq!(harness.workspace.creates(), 0);
    }

    #[tokio::test]
    async fn allowing_duplicates_replaces_ledger_entry() {
        let mut harness = Harness::new();
        harness.settings.avoid_duplicates = false;
        let issue = sample_issue(6);
        let mut ledger = Ledger::open_in_memory().unwrap();
        ledger.record(&issue.key, 77).unwrap();

        let status = migrate_issue(&harness.context(false), &mut ledger, &issue, &request())
            .await
            .unwrap();

        let MigrationStatus::Created(item) = &status else {
            panic!("expected a new story, got {status:?}");
        };
        assert_ne!(item.id, 77);
        assert_eq!(ledger.get(&issue.key).unwrap(), Some(item.id));
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let harness = Harness::new();
        let issue = sample_issue(8);
        let mut ledger = Ledger::open_in_memory().unwrap();

        let status = migrate_issue(&harness.context(true), &mut ledger, &issue, &request())
            .await
            .unwrap();

        assert_eq!(
            status,
            MigrationStatus::Planned {
                kind: ItemKind::Story
            }
        );
        assert!(harness.workspace.calls().is_empty());
        assert!(ledger.is_empty().unwrap());
    }

    #[tokio::test]
    async fn dry_run_skips_refresh() {
        let harness = Harness::new();
        let issue = sample_issue(8);
        let mut ledger = Ledger::open_in_memory().unwrap();
        ledger.record(&issue.key, 12).unwrap();

        let status = migrate_issue(&harness.context(true), &mut ledger, &issue, &request())
            .await
            .unwrap();

        assert!(status.is_skipped());
        assert!(harness.workspace.calls().is_empty());
    }

    #[tokio::test]
    async fn dry_run_rejects_unknown_technical_area() {
        let harness = Harness::new();
        let issue = sample_issue(8);
        let mut ledger = Ledger::open_in_memory().unwrap();
        let mobile = MigrationRequest {
            technical_area: Some("Mobile".to_string()),
            ..request()
        };

        let result = migrate_issue(&harness.context(true), &mut ledger, &issue, &mobile).await;

        assert!(matches!(
            result,
            Err(MigrationError::Workspace(
                ShortcutError::UnknownCustomFieldValue { .. }
            ))
        ));
        assert!(harness.workspace.calls().is_empty());
    }

    #[tokio::test]
    async fn dry_run_rejects_unknown_state_names() {
        let mut harness = Harness::new();
        harness
            .settings
            .issue_state_map
            .insert("open".to_string(), "Backlog".to_string());
        harness
            .settings
            .epic_state_map
            .insert("open".to_string(), "Someday".to_string());
        let story = sample_issue(8);
        let mut epic = sample_issue(9);
        epic.labels.push("Epic".to_string());
        let mut ledger = Ledger::open_in_memory().unwrap();
        let ctx = harness.context(true);

        assert!(matches!(
            migrate_issue(&ctx, &mut ledger, &story, &request()).await,
            Err(MigrationError::Workspace(ShortcutError::UnknownWorkflowState { .. }))
        ));
        assert!(matches!(
            migrate_issue(&ctx, &mut ledger, &epic, &request()).await,
            Err(MigrationError::Workspace(ShortcutError::UnknownEpicState { .. }))
        ));
        assert!(harness.workspace.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_state_mapping_is_fatal() {
        let mut harness = Harness::new();
        harness.settings.issue_state_map.remove("open");
        let issue = sample_issue(9);
        let mut ledger = Ledger::open_in_memory().unwrap();

        let result = migrate_issue(&harness.context(false), &mut ledger, &issue, &request()).await;

        assert!(matches!(
            result,
            Err(MigrationError::MissingStateMapping {
                map: "issue-state-map",
                ..
            })
        ));
        assert!(harness.workspace.calls().is_empty());
    }

    #[tokio::test]
    async fn attaches_rounded_estimate() {
        let mut harness = Harness::new();
        harness.epics.set_estimate(IssueKey::new(1234, 3), 2.6);
        let issue = sample_issue(3);
        let mut ledger = Ledger::open_in_memory().unwrap();

        migrate_issue(
            &harness.context_with_estimates(false),
            &mut ledger,
            &issue,
            &request(),
        )
        .await
        .unwrap();

        let calls = harness.workspace.calls();
        let WorkspaceCall::CreateStory(story) = &calls[0] else {
            panic!("expected create_story, got {:?}", calls[0]);
        };
        assert_eq!(story.estimate, Some(3));
    }

    #[tokio::test]
    async fn story_without_estimate_has_none() {
        let mut harness = Harness::new();
        harness.epics.set_estimate(IssueKey::new(1234, 3), 5.0);
        let issue = sample_issue(4);
        let mut ledger = Ledger::open_in_memory().unwrap();

        migrate_issue(
            &harness.context_with_estimates(false),
            &mut ledger,
            &issue,
            &request(),
        )
        .await
        .unwrap();

        let calls = harness.workspace.calls();
        let WorkspaceCall::CreateStory(story) = &calls[0] else {
            panic!("expected create_story, got {:?}", calls[0]);
        };
        assert_eq!(story.estimate, None);
    }

    #[test]
    fn rounds_estimates() {
        assert_eq!(round_estimate(0.4), 0);
        assert_eq!(round_estimate(1.5), 2);
        assert_eq!(round_estimate(8.0), 8);
    }
}
