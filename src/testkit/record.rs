//! Builders for raw engine records used across tests.
//!
//! Records mirror the shape of the engine's `/events` payloads so tests
//! focus on assertions rather than JSON boilerplate.

use serde_json::json;

use crate::domain::event::RawRecord;

/// Fixed event time used by every builder (seconds since the epoch).
pub const EVENT_TIME: i64 = 1_700_000_000;

/// A record of category `kind` about subject `id`.
pub fn record(kind: &str, action: &str, id: &str) -> RawRecord {
    raw(json!({
        "Type": kind,
        "Action": action,
        "Actor": { "ID": id, "Attributes": {} },
        "time": EVENT_TIME,
        "timeNano": EVENT_TIME * 1_000_000_000 + 42,
    }))
}

/// A container record; the container is named `{id}-name`.
pub fn container_record(id: &str, action: &str) -> RawRecord {
    raw(json!({
        "Type": "container",
        "Action": action,
        "status": action,
        "id": id,
        "Actor": {
            "ID": id,
            "Attributes": { "name": format!("{id}-name"), "image": "alpine:3" }
        },
        "time": EVENT_TIME,
        "timeNano": EVENT_TIME * 1_000_000_000 + 42,
    }))
}

fn raw(value: serde_json::Value) -> RawRecord {
    match value {
        serde_json::Value::Object(fields) => RawRecord::new(fields),
        _ => RawRecord::default(),
    }
}
