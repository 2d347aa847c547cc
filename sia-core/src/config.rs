use std::time::Duration;

use url::Url;

use crate::error::SiaError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:9980";
pub const DEFAULT_USER_AGENT: &str = "Sia-Agent";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Renter endpoint paths, relative to the base address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub delete: String,
    pub download: String,
    pub downloads: String,
    pub files: String,
    pub upload: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            delete: "/renter/delete".to_string(),
            download: "/renter/download".to_string(),
            downloads: "/renter/downloads".to_string(),
            files: "/renter/files".to_string(),
            upload: "/renter/upload".to_string(),
        }
    }
}

/// Everything a [`SiaClient`](crate::SiaClient) needs to reach a node.
///
/// Values are owned by the client that is built from them, so independent
/// clients (for example one per mock server in tests) never share state.
#[derive(Clone, Debug)]
pub struct SiaConfig {
    pub base_url: Url,
    pub user_agent: String,
    pub poll_interval: Duration,
    pub request_timeout: Option<Duration>,
    pub endpoints: Endpoints,
}

impl SiaConfig {
    pub fn new(base_url: &str) -> Result<Self, SiaError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: None,
            endpoints: Endpoints::default(),
        })
    }

    /// Builds a config from `SIA_*` variables, falling back to defaults for
    /// anything unset, unparsable or zero.
    pub fn from_env() -> Result<Self, SiaError> {
        let base_url =
            std::env::var("SIA_API_ADDR").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url)?;
        if let Ok(agent) = std::env::var("SIA_USER_AGENT") {
            if !agent.trim().is_empty() {
                config.user_agent = agent;
            }
        }
        if let Some(ms) = read_u64_env("SIA_POLL_INTERVAL_MS") {
            config.poll_interval = Duration::from_millis(ms);
        }
        config.request_timeout = read_u64_env("SIA_REQUEST_TIMEOUT_SECS").map(Duration::from_secs);
        Ok(config)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

fn parse_base_url(value: &str) -> Result<Url, SiaError> {
    let url = Url::parse(value)?;
    if url.cannot_be_a_base() {
        return Err(SiaError::InvalidBaseUrl(value.to_string()));
    }
    Ok(url)
}

fn read_u64_env(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}
