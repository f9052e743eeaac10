//! Configuration builders for tests.

use crate::infrastructure::config::{Config, ReconnectionConfig};

/// Reconnection settings with no delays, giving up after `max_failures`.
pub fn reconnection(max_failures: u32) -> ReconnectionConfig {
    ReconnectionConfig {
        initial_delay_ms: 0,
        max_delay_ms: 0,
        backoff_multiplier: 1.0,
        max_consecutive_failures: max_failures,
    }
}

/// Default config with the event logger off and a short drain timeout.
pub fn quiet_config() -> Config {
    let mut config = Config::default();
    config.watcher.log_events = false;
    config.watcher.drain_timeout_secs = 1;
    config.docker.reconnection = reconnection(1);
    config
}
