//! The watcher: a registry bound to a record source.

use std::sync::Arc;

use tokio::sync::watch;

use super::runtime;
use crate::adapter::handler::event_logger;
use crate::application::{FixturePool, Registry, RunReport};
use crate::error::Result;
use crate::infrastructure::config::settings::WatcherConfig;
use crate::port::outbound::source::RecordSource;

/// What one watch run did, from fixture startup to the final drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSummary {
    /// Records read from the source.
    pub records: usize,
    /// Records fanned out to handlers.
    pub dispatched: usize,
    /// Records skipped because they could not be classified.
    pub malformed: usize,
    /// Handler failures summed over every dispatched record.
    pub handler_failures: usize,
    /// Dispatches still running when the drain timeout elapsed.
    pub abandoned: usize,
    pub startup: RunReport,
    pub shutdown: RunReport,
}

/// Drives a [`Registry`] from a [`RecordSource`].
///
/// # Example
///
/// ```no_run
/// use swarmwatch::adapter::outbound::JsonLinesSource;
/// use swarmwatch::application::{FixturePool, Registry};
/// use swarmwatch::infrastructure::config::WatcherConfig;
/// use swarmwatch::infrastructure::orchestration::Watcher;
///
/// # async fn run() -> swarmwatch::error::Result<()> {
/// let watcher = Watcher::new(WatcherConfig::default(), Registry::new());
/// let summary = watcher.run(JsonLinesSource::stdin(), FixturePool::new()).await?;
/// println!("{} records", summary.records);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Watcher {
    config: WatcherConfig,
    registry: Arc<Registry>,
}

impl Watcher {
    /// Bind `registry` to this watcher, adding the event logger when
    /// `config.log_events` is set.
    #[must_use]
    pub fn new(config: WatcherConfig, mut registry: Registry) -> Self {
        if config.log_events {
            registry.add_handler(event_logger());
        }
        Self {
            config,
            registry: Arc::new(registry),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Watch until the source ends.
    pub async fn run<S>(&self, source: S, bootstrap: FixturePool) -> Result<WatchSummary>
    where
        S: RecordSource,
    {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        self.run_with_shutdown(source, bootstrap, shutdown_rx).await
    }

    /// Watch until the source ends or `shutdown` flips to `true`.
    ///
    /// Fails when fixtures cannot be resolved or the source cannot connect;
    /// fixtures already started are drained before the error is returned.
    pub async fn run_with_shutdown<S>(
        &self,
        source: S,
        bootstrap: FixturePool,
        shutdown: watch::Receiver<bool>,
    ) -> Result<WatchSummary>
    where
        S: RecordSource,
    {
        runtime::watch(
            Arc::clone(&self.registry),
            &self.config,
            source,
            bootstrap,
            shutdown,
        )
        .await
    }
}
