//! Fan-out of one event to every eligible handler.
//!
//! ```text
//! dispatch(event, pool)
//!     │
//!     ├─ select handlers with an event slot the event's class satisfies
//!     ├─ resolve each against [event] + pool   (event first)
//!     ├─ run all concurrently on this task      (join_all)
//!     └─ log + record each failure; never propagate
//! ```
//!
//! Handlers are interleaved on the calling task rather than spawned, so the
//! dispatcher never needs more than the caller's `Send` guarantees and a
//! handler that stalls only stalls its own dispatch call.

use std::iter;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, error};

use super::capability::{describe_slots, resolve_args, Candidate, Resolution};
use super::fixture::FixturePool;
use super::handler::Handler;
use super::report::{guarded, RunReport};
use crate::domain::event::Event;

pub(crate) async fn dispatch_event(
    handlers: &[Handler],
    event: &Arc<Event>,
    pool: &FixturePool,
) -> RunReport {
    let class = event.class();
    let action = event.action().unwrap_or("<missing>");

    let invocations: Vec<_> = handlers
        .iter()
        .filter(|handler| handler.capabilities().accepts_event(class))
        .map(move |handler| async move {
            let candidates = iter::once(Candidate::Event(event)).chain(pool.candidates());
            let outcome = match resolve_args(handler.capabilities(), candidates) {
                Resolution::Resolved(args) => guarded(|| handler.invoke(args)).await,
                Resolution::Unsatisfied(missing) => Err(format!(
                    "unsatisfied dependencies: {}",
                    describe_slots(&missing)
                )),
            };
            (handler.name(), outcome)
        })
        .collect();

    debug!(
        event_class = %class,
        action,
        handlers = invocations.len(),
        "Dispatching event"
    );

    let mut report = RunReport::default();
    for (name, outcome) in join_all(invocations).await {
        if let Err(reason) = &outcome {
            error!(
                handler = %name,
                event_class = %class,
                action,
                error = %reason,
                "Event handler failed"
            );
        }
        report.record(name, outcome);
    }
    report
}
