//! Ticket subject format.
//!
//! Redmine subjects are the only place grouping structure is recorded, so
//! they double as the wire format:
//!
//! - Root ticket: `[Root][Alert] {alertname}`
//! - Host ticket: `[Alert] {alertname} ({instance})`
//!
//! All formatting and parsing of subjects goes through this module.

use std::fmt;

const ROOT_TAG: &str = "[Root][Alert]";
const HOST_TAG: &str = "[Alert]";

/// Structured form of a grouping ticket subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// Parent ticket for a cluster spanning several hosts
    Root { alertname: String },
    /// Ticket for one alert on one instance
    Host { alertname: String, instance: String },
}

impl Subject {
    #[must_use]
    pub fn root(alertname: &str) -> Self {
        Self::Root {
            alertname: alertname.to_string(),
        }
    }

    #[must_use]
    pub fn host(alertname: &str, instance: &str) -> Self {
        Self::Host {
            alertname: alertname.to_string(),
            instance: instance.to_string(),
        }
    }

    /// Recover the structure of `subject` as a ticket for `alertname`.
    ///
    /// The alert name is required because it may itself contain spaces or
    /// parentheses; matching is anchored on the known name. Root subjects
    /// match by prefix. Host subjects need the exact prefix, a closing
    /// parenthesis, and a non-empty instance in between.
    #[must_use]
    pub fn parse_for(alertname: &str, subject: &str) -> Option<Self> {
        if subject.starts_with(&root_prefix(alertname)) {
            return Some(Self::root(alertname));
        }

        let instance = subject
            .strip_prefix(&host_prefix(alertname))?
            .strip_suffix(')')?;
        if instance.is_empty() {
            return None;
        }
        Some(Self::host(alertname, instance))
    }

    #[must_use]
    pub fn alertname(&self) -> &str {
        match self {
            Self::Root { alertname } | Self::Host { alertname, .. } => alertname,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root { alertname } => write!(f, "{ROOT_TAG} {alertname}"),
            Self::Host {
                alertname,
                instance,
            } => write!(f, "{HOST_TAG} {alertname} ({instance})"),
        }
    }
}

fn root_prefix(alertname: &str) -> String {
    format!("{ROOT_TAG} {alertname}")
}

fn host_prefix(alertname: &str) -> String {
    format!("{HOST_TAG} {alertname} (")
}
