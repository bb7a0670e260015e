//! ZenHub epic and estimate source.

use super::{EpicSource, SourceError};
use crate::api::ApiClient;
use crate::rate_limit::RateLimit;
use crate::types::IssueKey;
use async_trait::async_trait;
use serde::Deserialize;

/// Header carrying the ZenHub API token.
const TOKEN_HEADER: &str = "x-authentication-token";

#[derive(Debug, Deserialize)]
struct IssueRef {
    repo_id: u64,
    issue_number: u64,
}

impl From<IssueRef> for IssueKey {
    fn from(value: IssueRef) -> Self {
        IssueKey::new(value.repo_id, value.issue_number)
    }
}

#[derive(Debug, Deserialize)]
struct EpicList {
    epic_issues: Vec<IssueRef>,
}

#[derive(Debug, Deserialize)]
struct EpicData {
    issues: Vec<IssueRef>,
}

#[derive(Debug, Deserialize)]
struct IssueData {
    estimate: Option<Estimate>,
}

#[derive(Debug, Deserialize)]
struct Estimate {
    value: f64,
}

/// Client for the ZenHub REST API.
#[derive(Debug)]
pub struct ZenHubClient {
    api: ApiClient,
}

impl ZenHubClient {
    /// Builds a client for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, token: &str) -> Result<Self, SourceError> {
        let api = ApiClient::new("ZenHub", base_url, TOKEN_HEADER, token, RateLimit::ZENHUB)?;
        Ok(Self { api })
    }
}

#[async_trait]
impl EpicSource for ZenHubClient {
    async fn epics(&self, repo_id: u64) -> Result<Vec<IssueKey>, SourceError> {
        let list: EpicList = self
            .api
            .get(&format!("repositories/{repo_id}/epics"), &[])
            .await?;
        Ok(list.epic_issues.into_iter().map(IssueKey::from).collect())
    }

    async fn epic_children(
        &self,
        repo_id: u64,
        epic_number: u64,
    ) -> Result<Vec<IssueKey>, SourceError> {
        let data: EpicData = self
            .api
            .get(&format!("repositories/{repo_id}/epics/{epic_number}"), &[])
            .await?;
        Ok(data.issues.into_iter().map(IssueKey::from).collect())
    }

    async fn estimate(&self, key: IssueKey) -> Result<Option<f64>, SourceError> {
        let data: IssueData = self
            .api
            .get(
                &format!("repositories/{}/issues/{}", key.repo_id, key.number),
                &[],
            )
            .await?;
        Ok(data.estimate.map(|e| e.value))
    }
}
