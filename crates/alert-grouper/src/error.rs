//! Error types for alert grouping.

use thiserror::Error;

/// Failure while processing one alert. Never fatal to the batch.
#[derive(Debug, Error)]
pub enum GroupingError {
    /// Ticket tracker call failed
    #[error("{operation} failed: {source}")]
    Tracker {
        operation: &'static str,
        #[source]
        source: redmine::RedmineError,
    },
}

impl GroupingError {
    pub(crate) fn tracker(operation: &'static str) -> impl FnOnce(redmine::RedmineError) -> Self {
        move |source| Self::Tracker { operation, source }
    }
}

/// Invalid or missing startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}
