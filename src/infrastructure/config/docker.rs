//! Container engine connection and reconnection configuration.

use serde::Deserialize;

/// Engine API endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DockerConfig {
    /// Base URL of the engine API (`http://host:port`).
    ///
    /// Overridden by `DOCKER_HOST` when it names a TCP or HTTP endpoint.
    #[serde(default = "default_url")]
    pub url: String,
    /// Timeout for inspect requests in seconds. The event stream itself is
    /// long-lived and not subject to it.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Event stream reconnection settings.
    #[serde(default)]
    pub reconnection: ReconnectionConfig,
}

fn default_url() -> String {
    "http://127.0.0.1:2375".into()
}

const fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            request_timeout_secs: default_request_timeout_secs(),
            reconnection: ReconnectionConfig::default(),
        }
    }
}

/// Map a `DOCKER_HOST` value onto an HTTP base URL.
///
/// `tcp://` becomes `http://`; `http(s)://` is used as is. Other schemes
/// (e.g. `unix://`) are not reachable over HTTP and yield `None`.
#[must_use]
pub fn docker_host_url(host: &str) -> Option<String> {
    if let Some(rest) = host.strip_prefix("tcp://") {
        return Some(format!("http://{rest}"));
    }
    if host.starts_with("http://") || host.starts_with("https://") {
        return Some(host.to_string());
    }
    None
}

/// Event stream reconnection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectionConfig {
    /// Initial delay before first reconnection attempt (milliseconds).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Maximum delay between reconnection attempts (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Multiplier applied to delay after each failed attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Consecutive failed connects after which the stream gives up.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

const fn default_initial_delay_ms() -> u64 {
    1000
}

const fn default_max_delay_ms() -> u64 {
    60_000
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

const fn default_max_consecutive_failures() -> u32 {
    10
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}
