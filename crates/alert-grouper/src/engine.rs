//! Alert grouping engine: parse, classify, decide, mutate.
//!
//! Cluster state lives only in the tracker. Every alert re-reads it, so two
//! deliveries for the same alert name handled at the same time can both see
//! an empty cluster and both open tickets. Nothing here serializes them;
//! deployments rely on Alertmanager not overlapping deliveries for one
//! alert name.

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, info, warn};

use crate::classify::Cluster;
use crate::decision::{decide, Action};
use crate::error::GroupingError;
use crate::event::{AlertEvent, RawAlert, SkipReason, WebhookPayload};
use crate::render::{issue_description, recurrence_comment, root_description};
use crate::subject::Subject;
use crate::tracker::TicketTracker;

/// Result of processing one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    CreatedSingle {
        alertname: String,
        instance: String,
        issue_id: u64,
    },
    Commented {
        alertname: String,
        instance: String,
        issue_id: u64,
    },
    CreatedRootAndChild {
        alertname: String,
        root_issue_id: u64,
        instance: String,
        issue_id: u64,
    },
    CreatedChild {
        alertname: String,
        root_issue_id: u64,
        instance: String,
        issue_id: u64,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped(reason) => write!(f, "skip: {reason}"),
            Self::CreatedSingle {
                alertname,
                instance,
                issue_id,
            } => write!(
                f,
                "create_single alertname={alertname} instance={instance} issue_id={issue_id}"
            ),
            Self::Commented {
                alertname,
                instance,
                issue_id,
            } => write!(
                f,
                "add_comment alertname={alertname} instance={instance} issue_id={issue_id}"
            ),
            Self::CreatedRootAndChild {
                alertname,
                root_issue_id,
                instance,
                issue_id,
            } => write!(
                f,
                "create_root_and_child alertname={alertname} root_issue_id={root_issue_id} \
                 instance={instance} issue_id={issue_id}"
            ),
            Self::CreatedChild {
                alertname,
                root_issue_id,
                instance,
                issue_id,
            } => write!(
                f,
                "create_child alertname={alertname} root_issue_id={root_issue_id} \
                 instance={instance} issue_id={issue_id}"
            ),
        }
    }
}

/// Groups alerts into tracker tickets.
pub struct GroupingEngine<T> {
    tracker: T,
}

impl<T: TicketTracker> GroupingEngine<T> {
    #[must_use]
    pub fn new(tracker: T) -> Self {
        Self { tracker }
    }

    #[must_use]
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Read the live cluster for `alertname` as of `event_time`.
    pub async fn classify(
        &self,
        alertname: &str,
        event_time: DateTime<Utc>,
    ) -> Result<Cluster, GroupingError> {
        let issues = self
            .tracker
            .search_issues(alertname)
            .await
            .map_err(GroupingError::tracker("issue search"))?;

        let cluster = Cluster::classify(alertname, event_time, &issues);
        debug!(
            alertname = %alertname,
            searched = issues.len(),
            root = ?cluster.root.as_ref().map(|i| i.id),
            hosts = cluster.hosts.len(),
            "Classified tracker issues"
        );
        Ok(cluster)
    }

    /// Process one alert through to a single tracker action.
    pub async fn process_alert(&self, alert: &RawAlert) -> Result<Outcome, GroupingError> {
        let event = match AlertEvent::parse(alert, Utc::now()) {
            Ok(event) => event,
            Err(reason) => {
                debug!(alertname = %alert.name(), %reason, "Skipping alert");
                return Ok(Outcome::Skipped(reason));
            }
        };

        let cluster = self.classify(&event.alertname, event.event_time).await?;
        let action = decide(&cluster, &event);
        info!(
            alertname = %event.alertname,
            instance = %event.instance,
            action = action.name(),
            "Grouping decision"
        );

        self.execute(action, &event).await
    }

    /// Process a webhook batch strictly in order, one result per alert.
    ///
    /// Failures are reported per alert and never stop the batch.
    pub async fn process_batch(&self, payload: &WebhookPayload) -> Vec<String> {
        let mut results = Vec::with_capacity(payload.alerts.len());

        for value in &payload.alerts {
            let alert = match RawAlert::from_value(value.clone()) {
                Ok(alert) => alert.inherit(payload),
                Err(reason) => {
                    debug!(%reason, "Skipping alert");
                    results.push(Outcome::Skipped(reason).to_string());
                    continue;
                }
            };
            match self.process_alert(&alert).await {
                Ok(outcome) => results.push(outcome.to_string()),
                Err(e) => {
                    warn!(alertname = %alert.name(), error = %e, "Failed to process alert");
                    results.push(format!("error: {e}"));
                }
            }
        }

        results
    }

    async fn execute(&self, action: Action, event: &AlertEvent) -> Result<Outcome, GroupingError> {
        let alertname = event.alertname.clone();
        let instance = event.instance.clone();

        match action {
            Action::CreateStandalone => {
                let issue_id = self.create_host_issue(event, None).await?;
                info!(
                    alertname = %alertname,
                    instance = %instance,
                    issue_id,
                    "Created standalone ticket"
                );
                Ok(Outcome::CreatedSingle {
                    alertname,
                    instance,
                    issue_id,
                })
            }
            Action::AppendComment { issue_id } => {
                self.tracker
                    .add_comment(issue_id, &recurrence_comment(event))
                    .await
                    .map_err(GroupingError::tracker("add comment"))?;
                info!(
                    alertname = %alertname,
                    instance = %instance,
                    issue_id,
                    "Commented on existing ticket"
                );
                Ok(Outcome::Commented {
                    alertname,
                    instance,
                    issue_id,
                })
            }
            Action::PromoteToRoot { reparent } => {
                let root_issue_id = self
                    .tracker
                    .create_issue(
                        &Subject::root(&alertname).to_string(),
                        &root_description(&alertname),
                        self.tracker.root_tracker_id(),
                        None,
                    )
                    .await
                    .map_err(GroupingError::tracker("create root issue"))?;
                info!(alertname = %alertname, root_issue_id, "Created root ticket");

                for host_issue_id in reparent {
                    self.tracker
                        .set_parent(host_issue_id, root_issue_id)
                        .await
                        .map_err(GroupingError::tracker("set parent"))?;
                    debug!(
                        issue_id = host_issue_id,
                        root_issue_id,
                        "Moved host ticket under root"
                    );
                }

                let issue_id = self.create_host_issue(event, Some(root_issue_id)).await?;
                info!(
                    alertname = %alertname,
                    instance = %instance,
                    issue_id,
                    root_issue_id,
                    "Created child ticket"
                );
                Ok(Outcome::CreatedRootAndChild {
                    alertname,
                    root_issue_id,
                    instance,
                    issue_id,
                })
            }
            Action::AddChild { root_id } => {
                let issue_id = self.create_host_issue(event, Some(root_id)).await?;
                info!(
                    alertname = %alertname,
                    instance = %instance,
                    issue_id,
                    root_issue_id = root_id,
                    "Created child ticket"
                );
                Ok(Outcome::CreatedChild {
                    alertname,
                    root_issue_id: root_id,
                    instance,
                    issue_id,
                })
            }
        }
    }

    async fn create_host_issue(
        &self,
        event: &AlertEvent,
        parent_id: Option<u64>,
    ) -> Result<u64, GroupingError> {
        let subject = Subject::host(&event.alertname, &event.instance).to_string();
        let operation = if parent_id.is_some() {
            "create child issue"
        } else {
            "create issue"
        };
        self.tracker
            .create_issue(&subject, &issue_description(event), None, parent_id)
            .await
            .map_err(GroupingError::tracker(operation))
    }
}
