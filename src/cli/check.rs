//! Handler for `check config`.

use std::path::Path;

use crate::cli::output::{self, Status, Summary};
use crate::error::Result;
use crate::infrastructure::config::docker::docker_host_url;
use crate::infrastructure::config::settings::Config;

/// Validate the configuration file without watching.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    println!("Checking configuration: {}", path.display());

    let config = Config::load(path)?;
    output::status(Status::Ok, "Configuration file is valid");

    let reconnection = &config.docker.reconnection;
    let engine = Summary::new("Engine")
        .row("URL", &config.docker.url)
        .row("Request timeout", format!("{}s", config.docker.request_timeout_secs))
        .row(
            "Reconnect delay",
            format!(
                "{}ms .. {}ms (x{})",
                reconnection.initial_delay_ms,
                reconnection.max_delay_ms,
                reconnection.backoff_multiplier
            ),
        )
        .row(
            "Give up after",
            format!("{} failures", reconnection.max_consecutive_failures),
        );
    let watcher = Summary::new("Watcher")
        .row("Log level", &config.logging.level)
        .row("Log format", &config.logging.format)
        .row("Log events", config.watcher.log_events)
        .row("Drain timeout", format!("{}s", config.watcher.drain_timeout_secs));
    println!();
    print!("{engine}");
    println!();
    print!("{watcher}");

    if let Some(url) = std::env::var("DOCKER_HOST").ok().as_deref().and_then(docker_host_url) {
        println!();
        output::status(Status::Warn, format!("Engine URL taken from DOCKER_HOST ({url})"));
    }

    println!();
    println!("Configuration is ready to use.");
    Ok(())
}
