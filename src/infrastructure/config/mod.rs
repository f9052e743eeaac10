//! Infrastructure configuration modules.

pub mod docker;
pub mod logging;
pub mod settings;

pub use docker::{DockerConfig, ReconnectionConfig};
pub use logging::LoggingConfig;
pub use settings::{Config, WatcherConfig};
