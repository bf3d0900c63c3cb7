//! Partition tracker issues into the live cluster for one alert.

use chrono::{DateTime, TimeDelta, Utc};
use redmine::Issue;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::subject::Subject;

/// Hours a ticket stays relevant after its last update.
pub const WINDOW_HOURS: i64 = 4;

/// Recency window: issues last updated this long before the event (or
/// earlier) belong to a previous, unrelated cluster.
pub const WINDOW: TimeDelta = TimeDelta::hours(WINDOW_HOURS);

/// Whether an issue updated at `updated` is still live for an event at
/// `event_time`. Updates newer than the event always count.
#[must_use]
pub fn in_window(event_time: DateTime<Utc>, updated: DateTime<Utc>) -> bool {
    event_time - updated < WINDOW
}

/// Live tickets for one alert name at one event time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cluster {
    /// Most recently updated live root ticket
    pub root: Option<Issue>,
    /// Most recently updated live host ticket per instance
    pub hosts: BTreeMap<String, Issue>,
}

impl Cluster {
    /// Classify `issues` (in tracker order) for `alertname` as seen from
    /// `event_time`.
    ///
    /// Issues without an update time, outside the window, or whose subject
    /// is not a grouping subject for this alert are ignored. On equal
    /// update times the first issue seen wins.
    #[must_use]
    pub fn classify(alertname: &str, event_time: DateTime<Utc>, issues: &[Issue]) -> Self {
        let mut cluster = Self::default();

        for issue in issues {
            let Some(updated) = issue.updated_on else {
                continue;
            };
            if !in_window(event_time, updated) {
                continue;
            }

            match Subject::parse_for(alertname, &issue.subject) {
                Some(Subject::Root { .. }) => {
                    if newer(cluster.root.as_ref(), updated) {
                        cluster.root = Some(issue.clone());
                    }
                }
                Some(Subject::Host { instance, .. }) => {
                    if newer(cluster.hosts.get(&instance), updated) {
                        cluster.hosts.insert(instance, issue.clone());
                    }
                }
                None => {
                    debug!(
                        issue_id = issue.id,
                        subject = %issue.subject,
                        "Ignoring issue with unrelated subject"
                    );
                }
            }
        }

        cluster
    }

    /// No live tickets at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none() && self.hosts.is_empty()
    }

    #[must_use]
    pub fn host(&self, instance: &str) -> Option<&Issue> {
        self.hosts.get(instance)
    }
}

/// Strictly-newer check against the current candidate.
fn newer(current: Option<&Issue>, updated: DateTime<Utc>) -> bool {
    current
        .and_then(|issue| issue.updated_on)
        .map_or(true, |current| updated > current)
}
