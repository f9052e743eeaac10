//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all watcher settings.
//! Configuration is loaded from a TOML file; the engine endpoint can be
//! overridden through `DOCKER_HOST`.
//!
//! # Example
//!
//! ```no_run
//! use swarmwatch::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::docker::{docker_host_url, DockerConfig};
use super::logging::LoggingConfig;
use crate::error::{ConfigError, Result};

/// Watch loop settings.
#[derive(Debug, Clone, Deserialize)]
pub struct WatcherConfig {
    /// Register the built-in handler that logs every dispatched event.
    #[serde(default = "default_log_events")]
    pub log_events: bool,
    /// Seconds to wait for in-flight dispatches when the watcher stops.
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

const fn default_log_events() -> bool {
    true
}

const fn default_drain_timeout_secs() -> u64 {
    10
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            log_events: default_log_events(),
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub logging: LoggingConfig,
    #[serde(default)]
    pub docker: DockerConfig,
    #[serde(default)]
    pub watcher: WatcherConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Environment overrides are not consulted here; see [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply `DOCKER_HOST`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails, including after the environment override
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config = Self::parse_toml(&content)?;
        config.apply_docker_host(std::env::var("DOCKER_HOST").ok().as_deref());
        config.validate()?;
        Ok(config)
    }

    /// Replace the engine URL with a usable `DOCKER_HOST` value.
    pub fn apply_docker_host(&mut self, host: Option<&str>) {
        let Some(host) = host.filter(|h| !h.is_empty()) else {
            return;
        };
        match docker_host_url(host) {
            Some(url) => self.docker.url = url,
            None => debug!(host, "Ignoring DOCKER_HOST with unsupported scheme"),
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.docker.url.is_empty() {
            return Err(ConfigError::MissingField { field: "url" }.into());
        }
        let parsed = url::Url::parse(&self.docker.url).map_err(|e| ConfigError::InvalidValue {
            field: "url",
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "url",
                reason: "must use http or https".to_string(),
            }
            .into());
        }
        if self.docker.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.watcher.drain_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "drain_timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let reconnection = &self.docker.reconnection;
        if reconnection.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                reason: "must be at least 1.0".to_string(),
            }
            .into());
        }
        if reconnection.initial_delay_ms > reconnection.max_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "initial_delay_ms",
                reason: "must not exceed max_delay_ms".to_string(),
            }
            .into());
        }
        if reconnection.max_consecutive_failures == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_consecutive_failures",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Initialize the tracing subscriber from the logging section.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            docker: DockerConfig::default(),
            watcher: WatcherConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn minimal_config_takes_defaults() {
        let config = Config::parse_toml("[logging]\nlevel = \"debug\"\n").unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.docker.url, "http://127.0.0.1:2375");
        assert!(config.watcher.log_events);
        assert_eq!(config.watcher.drain_timeout_secs, 10);
        assert_eq!(config.docker.reconnection.max_consecutive_failures, 10);
    }

    #[test]
    fn logging_section_is_required() {
        let result = Config::parse_toml("[watcher]\nlog_events = false\n");
        assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
    }

    #[test]
    fn rejects_non_http_url() {
        let toml = "[logging]\n[docker]\nurl = \"ftp://engine:21\"\n";
        assert!(matches!(
            Config::parse_toml(toml),
            Err(Error::Config(ConfigError::InvalidValue { field: "url", .. }))
        ));
    }

    #[test]
    fn rejects_shrinking_backoff() {
        let toml = "[logging]\n[docker.reconnection]\nbackoff_multiplier = 0.5\n";
        assert!(matches!(
            Config::parse_toml(toml),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                ..
            }))
        ));
    }

    #[test]
    fn rejects_inverted_delays() {
        let toml = concat!(
            "[logging]\n",
            "[docker.reconnection]\n",
            "initial_delay_ms = 5000\n",
            "max_delay_ms = 100\n",
        );
        assert!(matches!(
            Config::parse_toml(toml),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "initial_delay_ms",
                ..
            }))
        ));
    }

    #[test]
    fn docker_host_override() {
        let mut config = Config::default();
        config.apply_docker_host(Some("tcp://swarm-manager:2375"));
        assert_eq!(config.docker.url, "http://swarm-manager:2375");

        config.apply_docker_host(Some("unix:///var/run/docker.sock"));
        assert_eq!(config.docker.url, "http://swarm-manager:2375");

        config.apply_docker_host(None);
        assert_eq!(config.docker.url, "http://swarm-manager:2375");
    }
}
