//! Error types for the Redmine client.

use thiserror::Error;

/// Errors that can occur when talking to Redmine.
#[derive(Debug, Error)]
pub enum RedmineError {
    /// Transport failure, including timeouts
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Redmine answered with a non-2xx status
    #[error("Redmine returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Malformed Redmine response: {0}")]
    Decode(String),
}

impl RedmineError {
    /// HTTP status code, if Redmine produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}
