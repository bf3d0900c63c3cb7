//! Groups Alertmanager alerts into Redmine tickets.
//!
//! Repeated or related alerts collapse into a small set of tickets instead
//! of one ticket per notification:
//!
//! - First alert for a name: a standalone `[Alert] {name} ({instance})` ticket
//! - Same alert and instance again within the window: a comment on that ticket
//! - A second instance: a `[Root][Alert] {name}` ticket is created and the
//!   existing host tickets become its children
//! - Further instances: new children under the existing root
//!
//! Tickets not updated within [`classify::WINDOW`] of an alert's start time
//! belong to an earlier cluster and are left alone. There is no local
//! state: every decision re-reads the tracker.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod event;
pub mod render;
pub mod server;
pub mod subject;
pub mod tracker;

pub use classify::{Cluster, WINDOW};
pub use config::GrouperConfig;
pub use decision::{decide, Action};
pub use engine::{GroupingEngine, Outcome};
pub use error::{ConfigError, GroupingError};
pub use event::{AlertEvent, RawAlert, SkipReason, WebhookPayload};
pub use server::{build_router, run_server};
pub use subject::Subject;
pub use tracker::TicketTracker;
