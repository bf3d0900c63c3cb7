//! Redmine issue model and request/response envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::ProjectRef;
use crate::time::parse_timestamp;

/// Reference to another issue (e.g. a parent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct IssueRef {
    pub id: u64,
}

/// Snapshot of a Redmine issue as returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Issue {
    /// Redmine-assigned issue id
    pub id: u64,
    /// Issue subject (title)
    #[serde(default)]
    pub subject: String,
    /// Last update time; `None` when absent or unparsable
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_on: Option<DateTime<Utc>>,
    /// Parent issue, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<IssueRef>,
}

impl Issue {
    /// Id of the parent issue, if any.
    #[must_use]
    pub fn parent_id(&self) -> Option<u64> {
        self.parent.map(|p| p.id)
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// One page of `GET /issues.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct IssuePage {
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// Fields for a new issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub subject: String,
    pub description: String,
    /// Tracker override; `None` uses the configured host tracker
    pub tracker_id: Option<u32>,
    /// Parent issue to attach to
    pub parent_issue_id: Option<u64>,
}

impl NewIssue {
    #[must_use]
    pub fn new(subject: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            description: description.into(),
            tracker_id: None,
            parent_issue_id: None,
        }
    }

    #[must_use]
    pub fn with_tracker(mut self, tracker_id: u32) -> Self {
        self.tracker_id = Some(tracker_id);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent_issue_id: u64) -> Self {
        self.parent_issue_id = Some(parent_issue_id);
        self
    }
}

/// Body of `POST /issues.json`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateIssueRequest<'a> {
    pub issue: CreateIssueFields<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateIssueFields<'a> {
    pub project_id: &'a ProjectRef,
    pub tracker_id: u32,
    pub subject: &'a str,
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_issue_id: Option<u64>,
}

/// Response of `POST /issues.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateIssueResponse {
    pub issue: IssueRef,
}

/// Body of `PUT /issues/{id}.json`. Only the set fields are sent.
#[derive(Debug, Default, Serialize)]
pub(crate) struct UpdateIssueRequest<'a> {
    pub issue: UpdateIssueFields<'a>,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct UpdateIssueFields<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_issue_id: Option<u64>,
}
