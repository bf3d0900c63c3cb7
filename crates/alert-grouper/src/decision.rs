//! Grouping decision: which single tracker action an alert produces.

use serde::Serialize;

use crate::classify::Cluster;
use crate::event::AlertEvent;

/// The one action taken for a firing alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// No live cluster: open a standalone host ticket
    CreateStandalone,
    /// This instance already has a live ticket: comment on it
    AppendComment { issue_id: u64 },
    /// A second host joined a rootless cluster: create the root, move the
    /// existing host tickets under it, then open a child for this host
    PromoteToRoot { reparent: Vec<u64> },
    /// The cluster already has a root: open a child ticket under it
    AddChild { root_id: u64 },
}

impl Action {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateStandalone => "create_standalone",
            Self::AppendComment { .. } => "append_comment",
            Self::PromoteToRoot { .. } => "promote_to_root",
            Self::AddChild { .. } => "add_child",
        }
    }
}

/// Decide the action for `event` given the live `cluster`.
///
/// Same-host recurrence takes precedence over everything else; a root is
/// only ever created when none is live.
#[must_use]
pub fn decide(cluster: &Cluster, event: &AlertEvent) -> Action {
    if let Some(issue) = cluster.host(&event.instance) {
        return Action::AppendComment { issue_id: issue.id };
    }

    match &cluster.root {
        Some(root) => Action::AddChild { root_id: root.id },
        None if cluster.hosts.is_empty() => Action::CreateStandalone,
        None => Action::PromoteToRoot {
            reparent: cluster.hosts.values().map(|issue| issue.id).collect(),
        },
    }
}
