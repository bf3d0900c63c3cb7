//! Ticket tracker boundary used by the grouping engine.

use async_trait::async_trait;
use redmine::{Issue, NewIssue, RedmineClient, RedmineError};

/// Remote issue tracker operations the engine relies on.
///
/// Every call is a single remote operation; nothing is cached or retried.
#[async_trait]
pub trait TicketTracker: Send + Sync {
    /// All issues whose subject contains `fragment`, in tracker order.
    async fn search_issues(&self, fragment: &str) -> Result<Vec<Issue>, RedmineError>;

    /// Create an issue and return its id. `tracker_id = None` uses the
    /// default tracker for host tickets.
    async fn create_issue(
        &self,
        subject: &str,
        description: &str,
        tracker_id: Option<u32>,
        parent_id: Option<u64>,
    ) -> Result<u64, RedmineError>;

    async fn add_comment(&self, issue_id: u64, text: &str) -> Result<(), RedmineError>;

    async fn set_parent(&self, issue_id: u64, parent_id: u64) -> Result<(), RedmineError>;

    /// Tracker to file root tickets under.
    fn root_tracker_id(&self) -> Option<u32> {
        None
    }
}

#[async_trait]
impl TicketTracker for RedmineClient {
    async fn search_issues(&self, fragment: &str) -> Result<Vec<Issue>, RedmineError> {
        RedmineClient::search_issues(self, fragment).await
    }

    async fn create_issue(
        &self,
        subject: &str,
        description: &str,
        tracker_id: Option<u32>,
        parent_id: Option<u64>,
    ) -> Result<u64, RedmineError> {
        let mut issue = NewIssue::new(subject, description);
        issue.tracker_id = tracker_id;
        issue.parent_issue_id = parent_id;
        RedmineClient::create_issue(self, &issue).await
    }

    async fn add_comment(&self, issue_id: u64, text: &str) -> Result<(), RedmineError> {
        self.add_note(issue_id, text).await
    }

    async fn set_parent(&self, issue_id: u64, parent_id: u64) -> Result<(), RedmineError> {
        RedmineClient::set_parent(self, issue_id, parent_id).await
    }

    fn root_tracker_id(&self) -> Option<u32> {
        Some(self.config().root_tracker_id)
    }
}
