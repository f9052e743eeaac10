//! Watch loop lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

use super::watcher::WatchSummary;
use crate::application::{FixturePool, Registry, RunReport};
use crate::error::Result;
use crate::infrastructure::config::settings::WatcherConfig;
use crate::port::outbound::source::RecordSource;

type Dispatched = std::result::Result<Result<RunReport>, JoinError>;

/// Loop entrypoint used by [`Watcher`](super::Watcher).
pub(super) async fn watch<S: RecordSource>(
    registry: Arc<Registry>,
    config: &WatcherConfig,
    mut source: S,
    bootstrap: FixturePool,
    mut shutdown: watch::Receiver<bool>,
) -> Result<WatchSummary> {
    info!(
        source = source.source_name(),
        handlers = registry.handlers().len(),
        startup_hooks = registry.startup_hooks().len(),
        "Starting watcher"
    );

    let pool = match registry.resolve_fixtures(bootstrap).await {
        Ok(pool) => Arc::new(pool),
        Err(e) => {
            registry.shutdown().await;
            return Err(e);
        }
    };

    let mut summary = WatchSummary {
        startup: registry.run_startup(&pool).await,
        ..WatchSummary::default()
    };

    if let Err(e) = source.connect().await {
        error!(source = source.source_name(), error = %e, "Failed to connect");
        registry.shutdown().await;
        return Err(e);
    }
    info!(source = source.source_name(), "Watching for events...");

    let mut tasks: JoinSet<Result<RunReport>> = JoinSet::new();

    if *shutdown.borrow() {
        info!("Shutdown requested before first record");
    } else {
        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    match result {
                        Ok(()) => {
                            if *shutdown.borrow() {
                                info!("Shutdown signal received");
                                break;
                            }
                        }
                        Err(_) => {
                            info!("Shutdown channel closed");
                            break;
                        }
                    }
                }
                record = source.next_record() => {
                    let Some(raw) = record else {
                        warn!(source = source.source_name(), "Event stream ended");
                        break;
                    };
                    summary.records += 1;

                    let registry = Arc::clone(&registry);
                    let pool = Arc::clone(&pool);
                    tasks.spawn(async move { registry.dispatch(raw, &pool).await });

                    while let Some(joined) = tasks.try_join_next() {
                        absorb(&mut summary, joined);
                    }
                }
            }
        }
    }

    drain(&mut tasks, &mut summary, Duration::from_secs(config.drain_timeout_secs)).await;

    summary.shutdown = registry.shutdown().await;
    info!(
        records = summary.records,
        dispatched = summary.dispatched,
        malformed = summary.malformed,
        handler_failures = summary.handler_failures,
        "Watcher stopped"
    );
    Ok(summary)
}

/// Await in-flight dispatches up to `timeout`, then abort the rest.
async fn drain(
    tasks: &mut JoinSet<Result<RunReport>>,
    summary: &mut WatchSummary,
    timeout: Duration,
) {
    if tasks.is_empty() {
        return;
    }
    info!(in_flight = tasks.len(), "Waiting for in-flight dispatches");

    let finished = tokio::time::timeout(timeout, async {
        while let Some(joined) = tasks.join_next().await {
            absorb(summary, joined);
        }
    })
    .await;

    if finished.is_err() {
        summary.abandoned = tasks.len();
        warn!(
            abandoned = summary.abandoned,
            timeout_secs = timeout.as_secs(),
            "Drain timeout elapsed, aborting in-flight dispatches"
        );
        tasks.abort_all();
    }
}

fn absorb(summary: &mut WatchSummary, joined: Dispatched) {
    match joined {
        Ok(Ok(report)) => {
            summary.dispatched += 1;
            summary.handler_failures += report.failures.len();
        }
        Ok(Err(e)) => {
            summary.malformed += 1;
            warn!(error = %e, "Skipping malformed record");
        }
        Err(e) => {
            error!(error = %e, "Dispatch task failed");
        }
    }
}
