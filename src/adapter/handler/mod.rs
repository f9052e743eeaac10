//! Built-in event handlers.

use tracing::info;

use crate::application::{Capabilities, Handler};
use crate::domain::event::Event;

/// Name under which [`event_logger`] registers.
pub const EVENT_LOGGER: &str = "event-logger";

/// Handler that logs every event it receives at `info`.
///
/// Container events additionally carry the container name and status.
/// Fields missing from a record are logged as `-`.
#[must_use]
pub fn event_logger() -> Handler {
    Handler::new(EVENT_LOGGER, Capabilities::new().event("event"), |args| async move {
        let event = args.event("event")?;
        log_event(&event);
        Ok(())
    })
}

fn log_event(event: &Event) {
    let kind = event.kind().unwrap_or("-");
    let action = event.action().unwrap_or("-");
    let id = event.id().unwrap_or("-");
    let time = event
        .timestamp()
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_else(|_| "-".into());

    match event.as_container() {
        Some(container) => info!(
            kind,
            action,
            id,
            time = %time,
            name = container.name().unwrap_or("-"),
            status = container.status().unwrap_or("-"),
            "Container event"
        ),
        None => info!(kind, action, id, time = %time, "Event"),
    }
}
