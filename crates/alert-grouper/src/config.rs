//! Startup configuration.

use redmine::{ProjectRef, RedmineConfig};

use crate::error::ConfigError;

const ENV_REDMINE_URL: &str = "REDMINE_URL";
const ENV_REDMINE_API_KEY: &str = "REDMINE_API_KEY";
const ENV_REDMINE_PROJECT_ID: &str = "REDMINE_PROJECT_ID";
const ENV_REDMINE_TRACKER_ID: &str = "REDMINE_TRACKER_ID";
const ENV_REDMINE_ROOT_TRACKER_ID: &str = "REDMINE_ROOT_TRACKER_ID";
const ENV_REDMINE_TIMEOUT_SECS: &str = "REDMINE_TIMEOUT_SECS";

/// Configuration for the alert grouper, read once at startup.
#[derive(Debug, Clone)]
pub struct GrouperConfig {
    /// Tracker connection
    pub redmine: RedmineConfig,
}

impl GrouperConfig {
    /// Create configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `REDMINE_URL`: Redmine base URL
    /// - `REDMINE_API_KEY`: API key sent as `X-Redmine-API-Key`
    /// - `REDMINE_PROJECT_ID`: numeric id or identifier of the project
    /// - `REDMINE_TRACKER_ID`: tracker for host tickets
    ///
    /// # Optional Environment Variables
    /// - `REDMINE_ROOT_TRACKER_ID`: tracker for root tickets (default: `REDMINE_TRACKER_ID`)
    /// - `REDMINE_TIMEOUT_SECS`: per-request timeout (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let base_url = required(ENV_REDMINE_URL)?;
        let api_key = required(ENV_REDMINE_API_KEY)?;
        let project = ProjectRef::parse(&required(ENV_REDMINE_PROJECT_ID)?);
        let tracker_id = parse(ENV_REDMINE_TRACKER_ID, &required(ENV_REDMINE_TRACKER_ID)?)?;

        let mut redmine = RedmineConfig::new(&base_url, &api_key, project, tracker_id);
        if let Some(value) = get(ENV_REDMINE_ROOT_TRACKER_ID) {
            redmine = redmine.with_root_tracker(parse(ENV_REDMINE_ROOT_TRACKER_ID, &value)?);
        }
        if let Some(value) = get(ENV_REDMINE_TIMEOUT_SECS) {
            redmine = redmine.with_timeout_secs(parse(ENV_REDMINE_TIMEOUT_SECS, &value)?);
        }

        Ok(Self { redmine })
    }
}

fn parse<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
