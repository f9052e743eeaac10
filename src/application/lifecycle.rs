//! Startup and shutdown passes.

use tracing::{error, info, warn};

use super::capability::{describe_slots, resolve_args, Resolution};
use super::fixture::FixturePool;
use super::handler::StartupHook;
use super::report::{guarded, RunReport};
use super::resolver::StartedFixture;

/// Run every startup hook once, in registration order, one at a time.
///
/// Hooks see pool values only. A hook whose slots cannot be filled is a
/// configuration error: it is reported and skipped, and the remaining hooks
/// still run.
pub(crate) async fn run_startup(hooks: &[StartupHook], pool: &FixturePool) -> RunReport {
    let mut report = RunReport::default();

    for hook in hooks {
        let outcome = match resolve_args(hook.capabilities(), pool.candidates()) {
            Resolution::Resolved(args) => guarded(|| hook.invoke(args)).await,
            Resolution::Unsatisfied(missing) => Err(format!(
                "unsatisfied dependencies: {}",
                describe_slots(&missing)
            )),
        };

        match &outcome {
            Ok(()) => info!(hook = %hook.name(), "Startup hook completed"),
            Err(reason) => error!(hook = %hook.name(), error = %reason, "Startup hook failed"),
        }
        report.record(hook.name(), outcome);
    }

    report
}

/// Drain started fixtures in start order, running each teardown.
pub(crate) async fn run_shutdown(started: Vec<StartedFixture>) -> RunReport {
    let mut report = RunReport::default();

    for fixture in started {
        let outcome = match fixture.teardown {
            Some(teardown) => guarded(teardown).await,
            None => Ok(()),
        };

        if let Err(reason) = &outcome {
            warn!(fixture = %fixture.name, error = %reason, "Fixture teardown failed");
        }
        report.record(&fixture.name, outcome);
    }

    info!(
        drained = report.attempted,
        failed = report.failures.len(),
        "Fixtures drained"
    );
    report
}
