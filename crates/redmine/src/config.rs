//! Connection settings for a Redmine instance.

use serde::Serialize;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default page size for issue searches.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Redmine project reference, either a numeric id or a string identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProjectRef {
    /// Numeric project id
    Id(u64),
    /// Project identifier (slug)
    Identifier(String),
}

impl ProjectRef {
    /// Interpret a configured value, preferring a numeric id.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        value
            .parse::<u64>()
            .map_or_else(|_| Self::Identifier(value.to_string()), Self::Id)
    }

    /// Value used in query strings.
    #[must_use]
    pub fn as_query_value(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Identifier(ident) => ident.clone(),
        }
    }
}

/// Configuration for the Redmine client
#[derive(Debug, Clone)]
pub struct RedmineConfig {
    /// Base URL without a trailing slash
    pub base_url: String,
    /// Value of the `X-Redmine-API-Key` header
    pub api_key: String,
    /// Project every issue is searched in and created under
    pub project: ProjectRef,
    /// Tracker for host tickets
    pub tracker_id: u32,
    /// Tracker for root tickets
    pub root_tracker_id: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Issues requested per search page
    pub page_size: u32,
}

impl RedmineConfig {
    /// Create a configuration with default timeout and page size.
    ///
    /// Root tickets use the same tracker as host tickets until
    /// [`RedmineConfig::with_root_tracker`] says otherwise.
    #[must_use]
    pub fn new(base_url: &str, api_key: &str, project: ProjectRef, tracker_id: u32) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            project,
            tracker_id,
            root_tracker_id: tracker_id,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn with_root_tracker(mut self, root_tracker_id: u32) -> Self {
        self.root_tracker_id = root_tracker_id;
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}
