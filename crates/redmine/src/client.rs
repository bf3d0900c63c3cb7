//! HTTP client for the Redmine issues API.

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::RedmineConfig;
use crate::error::RedmineError;
use crate::types::{
    CreateIssueFields, CreateIssueRequest, CreateIssueResponse, Issue, IssuePage, NewIssue,
    UpdateIssueFields, UpdateIssueRequest,
};

const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// Redmine REST client.
///
/// Each method is a single request (or, for search, a sequence of page
/// requests) with the configured timeout and no retries.
#[derive(Debug, Clone)]
pub struct RedmineClient {
    config: RedmineConfig,
    client: reqwest::Client,
}

impl RedmineClient {
    /// Create a client for the given configuration.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: RedmineConfig) -> Result<Self, RedmineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    #[must_use]
    pub fn config(&self) -> &RedmineConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(API_KEY_HEADER, &self.config.api_key)
    }

    /// Search issues in the configured project whose subject contains
    /// `fragment`, across all statuses, most recently updated first.
    ///
    /// Pages are fetched until Redmine reports no more results.
    pub async fn search_issues(&self, fragment: &str) -> Result<Vec<Issue>, RedmineError> {
        let url = self.url("issues.json");
        let project = self.config.project.as_query_value();
        let subject = format!("~{fragment}");
        let limit = self.config.page_size.to_string();

        let mut issues = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let offset_param = offset.to_string();
            let request = self.authorized(self.client.get(&url)).query(&[
                ("project_id", project.as_str()),
                ("status_id", "*"),
                ("subject", subject.as_str()),
                ("offset", offset_param.as_str()),
                ("limit", limit.as_str()),
                ("sort", "updated_on:desc"),
            ]);

            let page: IssuePage = decode(check(request.send().await?).await?).await?;
            let fetched = page.issues.len() as u64;
            issues.extend(page.issues);
            offset += fetched;

            let total = page.total_count.unwrap_or(issues.len() as u64);
            debug!(
                fragment = %fragment,
                fetched,
                offset,
                total,
                "Fetched Redmine issue page"
            );

            if fetched == 0 || offset >= total {
                break;
            }
        }

        Ok(issues)
    }

    /// Create an issue and return its id.
    pub async fn create_issue(&self, issue: &NewIssue) -> Result<u64, RedmineError> {
        let body = CreateIssueRequest {
            issue: CreateIssueFields {
                project_id: &self.config.project,
                tracker_id: issue.tracker_id.unwrap_or(self.config.tracker_id),
                subject: &issue.subject,
                description: &issue.description,
                parent_issue_id: issue.parent_issue_id,
            },
        };

        let request = self
            .authorized(self.client.post(self.url("issues.json")))
            .json(&body);
        let created: CreateIssueResponse = decode(check(request.send().await?).await?).await?;

        debug!(
            issue_id = created.issue.id,
            subject = %issue.subject,
            parent_issue_id = ?issue.parent_issue_id,
            "Created Redmine issue"
        );
        Ok(created.issue.id)
    }

    /// Append a note (journal comment) to an issue.
    pub async fn add_note(&self, issue_id: u64, notes: &str) -> Result<(), RedmineError> {
        self.update(
            issue_id,
            UpdateIssueFields {
                notes: Some(notes),
                ..Default::default()
            },
        )
        .await
    }

    /// Make `issue_id` a child of `parent_id`.
    pub async fn set_parent(&self, issue_id: u64, parent_id: u64) -> Result<(), RedmineError> {
        self.update(
            issue_id,
            UpdateIssueFields {
                parent_issue_id: Some(parent_id),
                ..Default::default()
            },
        )
        .await
    }

    async fn update(
        &self,
        issue_id: u64,
        fields: UpdateIssueFields<'_>,
    ) -> Result<(), RedmineError> {
        let request = self
            .authorized(self.client.put(self.url(&format!("issues/{issue_id}.json"))))
            .json(&UpdateIssueRequest { issue: fields });
        check(request.send().await?).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into [`RedmineError::Status`].
async fn check(response: Response) -> Result<Response, RedmineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RedmineError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RedmineError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| RedmineError::Decode(e.to_string()))
}
