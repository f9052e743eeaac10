//! The registry: explicit home for fixtures, startup hooks and handlers.
//!
//! Built once at boot, then driven through its lifecycle:
//!
//! ```text
//! Registry::new()
//!   .add_fixture(..) / .add_startup_hook(..) / .add_handler(..)
//!        │
//!        ▼
//! resolve_fixtures(bootstrap) ──► FixturePool   (fatal on unresolvable graph)
//!        │
//!        ▼
//! run_startup(&pool)                            (sequential, isolated)
//!        │
//!        ▼
//! dispatch(raw, &pool)  × N                     (fan-out, isolated)
//!        │
//!        ▼
//! shutdown()                                    (drain in start order)
//! ```
//!
//! Everything after registration takes `&self`, so the registry can be
//! shared behind an `Arc` by concurrent dispatch tasks.

use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use super::dispatch;
use super::fixture::{Fixture, FixturePool};
use super::handler::{Handler, StartupHook};
use super::lifecycle;
use super::report::RunReport;
use super::resolver::{self, StartedFixture};
use crate::domain::event::{Event, RawRecord};
use crate::error::Result;
use crate::port::outbound::inspector::ContainerInspector;

/// Registered fixtures, startup hooks and event handlers.
///
/// # Example
///
/// ```
/// use swarmwatch::application::{Capabilities, Fixture, FixturePool, Handler, Registry, Resource};
///
/// struct Greeting(&'static str);
///
/// # tokio_test_block_on(async {
/// let mut registry = Registry::new();
/// registry
///     .add_fixture(Fixture::new("greeting", Capabilities::new(), |_| async {
///         Ok(Resource::new(Greeting("hello")))
///     }))
///     .add_handler(Handler::new(
///         "greet",
///         Capabilities::new().event("event").fixture::<Greeting>("greeting"),
///         |args| async move {
///             let greeting = args.fixture::<Greeting>("greeting")?;
///             println!("{} {}", greeting.0, args.event("event")?.action()?);
///             Ok(())
///         },
///     ));
///
/// let pool = registry.resolve_fixtures(FixturePool::new()).await?;
/// registry.run_startup(&pool).await;
/// registry.shutdown().await;
/// # Ok::<(), swarmwatch::error::Error>(())
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Default)]
pub struct Registry {
    fixtures: Mutex<Vec<Fixture>>,
    startup_hooks: Vec<StartupHook>,
    handlers: Vec<Handler>,
    started: Mutex<Vec<StartedFixture>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_fixture(&mut self, fixture: Fixture) -> &mut Self {
        self.fixtures.get_mut().push(fixture);
        self
    }

    pub fn add_startup_hook(&mut self, hook: StartupHook) -> &mut Self {
        self.startup_hooks.push(hook);
        self
    }

    pub fn add_handler(&mut self, handler: Handler) -> &mut Self {
        self.handlers.push(handler);
        self
    }

    #[must_use]
    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    #[must_use]
    pub fn startup_hooks(&self) -> &[StartupHook] {
        &self.startup_hooks
    }

    /// Fixtures registered but not yet started.
    #[must_use]
    pub fn pending_fixtures(&self) -> usize {
        self.fixtures.lock().len()
    }

    /// Fixtures started and not yet drained.
    #[must_use]
    pub fn started_fixtures(&self) -> usize {
        self.started.lock().len()
    }

    /// Start every registered fixture, seeding the pool with `bootstrap`.
    ///
    /// Fails with [`UnresolvableDependency`](crate::error::Error::UnresolvableDependency)
    /// when some fixtures can never be satisfied, and with
    /// [`FixtureStartup`](crate::error::Error::FixtureStartup) when a factory
    /// errors. Calling it again finds an empty worklist and returns `bootstrap`.
    pub async fn resolve_fixtures(&self, bootstrap: FixturePool) -> Result<FixturePool> {
        let fixtures = mem::take(&mut *self.fixtures.lock());
        let total = fixtures.len();

        let pool = resolver::resolve(fixtures, bootstrap, &self.started).await?;
        info!(fixtures = total, pool = pool.len(), "Fixtures resolved");
        Ok(pool)
    }

    /// Run startup hooks in registration order.
    pub async fn run_startup(&self, pool: &FixturePool) -> RunReport {
        lifecycle::run_startup(&self.startup_hooks, pool).await
    }

    /// Classify `raw` and fan it out to every eligible handler.
    ///
    /// Container events are wired to the `Arc<dyn ContainerInspector>` found
    /// in the pool, if any. Only a malformed record is an error; handler
    /// failures are logged and returned in the report.
    pub async fn dispatch(&self, raw: RawRecord, pool: &FixturePool) -> Result<RunReport> {
        let inspector = pool
            .get::<Arc<dyn ContainerInspector>>()
            .map(|inspector| Arc::clone(&*inspector));
        let event = Arc::new(Event::classify(raw, inspector)?);
        Ok(self.dispatch_event(&event, pool).await)
    }

    /// Fan an already classified event out to every eligible handler.
    pub async fn dispatch_event(&self, event: &Arc<Event>, pool: &FixturePool) -> RunReport {
        dispatch::dispatch_event(&self.handlers, event, pool).await
    }

    /// Drain every started fixture, running teardowns in start order.
    pub async fn shutdown(&self) -> RunReport {
        let started = mem::take(&mut *self.started.lock());
        lifecycle::run_shutdown(started).await
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("pending_fixtures", &self.pending_fixtures())
            .field("started_fixtures", &self.started_fixtures())
            .field("startup_hooks", &self.startup_hooks.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
