//! Minimal Redmine REST client used for alert ticket grouping.
//!
//! Only the slice of the Redmine API the grouper needs is covered:
//!
//! - Paginated issue search by subject substring (all statuses)
//! - Issue creation with an optional parent
//! - Appending notes to an issue
//! - Reassigning an issue's parent
//!
//! # Usage
//!
//! ```no_run
//! use redmine::{NewIssue, ProjectRef, RedmineClient, RedmineConfig};
//!
//! # async fn run() -> Result<(), redmine::RedmineError> {
//! let config = RedmineConfig::new(
//!     "https://redmine.example.com",
//!     "api-key",
//!     ProjectRef::parse("ops"),
//!     3,
//! );
//! let client = RedmineClient::new(config)?;
//!
//! let issues = client.search_issues("HighCPU").await?;
//! let id = client
//!     .create_issue(&NewIssue::new("[Alert] HighCPU (h1)", "details"))
//!     .await?;
//! client.add_note(id, "fired again").await?;
//! # let _ = issues;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod time;
pub mod types;

pub use client::RedmineClient;
pub use config::{ProjectRef, RedmineConfig};
pub use error::RedmineError;
pub use types::{Issue, IssueRef, NewIssue};
