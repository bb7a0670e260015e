//! Shortcut REST API payloads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format accepted by the Shortcut API.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// Workspace metadata

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Workflow {
    pub name: String,
    pub states: Vec<NamedId>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NamedId {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EpicWorkflow {
    pub epic_states: Vec<NamedId>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Member {
    pub id: String,
    pub profile: MemberProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MemberProfile {
    pub mention_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Label {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CustomField {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub values: Vec<CustomFieldValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CustomFieldValue {
    pub id: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Group {
    pub id: String,
    pub mention_name: String,
}

// Responses

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ItemRecord {
    pub id: u64,
    pub app_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EpicRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub archived: bool,
    pub updated_at: DateTime<Utc>,
}

// Requests

#[derive(Debug, Serialize)]
pub(crate) struct LabelParams<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CustomFieldParams {
    pub field_id: String,
    pub value_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateEpicBody<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub created_at: String,
    pub epic_state_id: u64,
    pub owner_ids: Vec<String>,
    pub requested_by_id: Option<String>,
    pub external_id: &'a str,
    pub labels: Vec<LabelParams<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateStoryBody<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub created_at: String,
    pub workflow_state_id: u64,
    pub owner_ids: Vec<String>,
    pub requested_by_id: Option<String>,
    pub external_id: &'a str,
    pub labels: Vec<LabelParams<'a>>,
    pub estimate: Option<i64>,
    pub custom_fields: Vec<CustomFieldParams>,
    pub external_links: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateCommentBody<'a> {
    pub text: &'a str,
    pub author_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct UpdateStoryBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_links: Option<&'a [String]>,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct UpdateEpicBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateIterationBody<'a> {
    pub name: &'a str,
    pub start_date: String,
    pub end_date: String,
    pub group_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn formats_timestamps_without_fraction() {
        let at = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(format_timestamp(&at), "2021-03-04T05:06:07Z");
    }

    #[test]
    fn story_patch_only_sends_set_fields() {
        let body = UpdateStoryBody {
            epic_id: Some(12),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({ "epic_id": 12 }));
    }

    #[test]
    fn parses_epic_record() {
        let record: EpicRecord = serde_json::from_value(json!({
            "id": 7,
            "name": "Platform",
            "archived": false,
            "updated_at": "2022-01-02T03:04:05Z",
            "app_url": "https://app.shortcut.com/acme/epic/7"
        }))
        .unwrap();

        assert_eq!(record.id, 7);
        assert!(!record.archived);
    }
}
