//! Handler for the `run` command.

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::outbound::{DockerClient, JsonLinesSource, ReconnectingSource};
use crate::application::{FixturePool, Registry};
use crate::cli::RunArgs;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration::Watcher;
use crate::port::outbound::inspector::ContainerInspector;
use crate::port::outbound::source::RecordSource;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;

    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
    config.init_logging();

    info!(
        engine = %config.docker.url,
        stdin = args.stdin,
        "swarmwatch starting"
    );

    let client = DockerClient::from_config(&config.docker);
    let inspector: Arc<dyn ContainerInspector> = Arc::new(client.clone());
    let bootstrap = FixturePool::new().with(inspector);

    let source: Box<dyn RecordSource> = if args.stdin {
        Box::new(JsonLinesSource::stdin())
    } else {
        Box::new(ReconnectingSource::new(
            client.event_stream(),
            config.docker.reconnection.clone(),
        ))
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received"),
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
        let _ = shutdown_tx.send(true);
    });

    let watcher = Watcher::new(config.watcher.clone(), Registry::new());
    let summary = watcher.run_with_shutdown(source, bootstrap, shutdown_rx).await?;

    info!(
        records = summary.records,
        dispatched = summary.dispatched,
        malformed = summary.malformed,
        handler_failures = summary.handler_failures,
        "swarmwatch stopped"
    );
    Ok(())
}
