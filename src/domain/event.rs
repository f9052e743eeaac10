//! Typed events derived from raw engine records.
//!
//! A [`RawRecord`] is whatever the engine's event stream produced for one
//! lifecycle occurrence. [`Event::classify`] inspects its `Type` discriminant
//! and wraps it in the matching variant:
//!
//! ```text
//! Type = "container"  ──► Event::Container(ContainerEvent)
//! Type = anything else ──► Event::Generic(EventRecord)      (debug log, not an error)
//! Type missing         ──► Error::MalformedEvent { field: "Type" }
//! ```
//!
//! Variants form a one-level hierarchy expressed through [`EventClass`]:
//! every class descends from [`EventClass::Any`], so a handler asking for
//! `Any` receives every event while a handler asking for
//! [`EventClass::Container`] only receives container events.

use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::container::ContainerDetails;
use crate::error::{Error, InspectError, Result};
use crate::port::outbound::inspector::ContainerInspector;

/// Discriminant value of container lifecycle records.
pub const CONTAINER_CATEGORY: &str = "container";

/// One structured record from the engine's event stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn pointer(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('/');
        let first = parts.next()?;
        parts.try_fold(self.0.get(first)?, |value, key| value.get(key))
    }
}

impl TryFrom<Value> for RawRecord {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(Error::MalformedEvent { field: "<root>" }),
        }
    }
}

/// Position of an event variant in the event hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    /// The base class; every event is an `Any`.
    Any,
    /// Container lifecycle events.
    Container,
}

impl EventClass {
    /// The class itself followed by each of its ancestors.
    #[must_use]
    pub const fn lineage(self) -> &'static [EventClass] {
        match self {
            Self::Any => &[Self::Any],
            Self::Container => &[Self::Container, Self::Any],
        }
    }

    /// True when `self` is `ancestor` or descends from it.
    #[must_use]
    pub fn is_a(self, ancestor: EventClass) -> bool {
        self.lineage().contains(&ancestor)
    }

    /// Maps a record's `Type` discriminant to a specialized class.
    #[must_use]
    pub fn from_discriminant(kind: &str) -> Option<Self> {
        match kind {
            CONTAINER_CATEGORY => Some(Self::Container),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "Event",
            Self::Container => "ContainerEvent",
        }
    }
}

impl fmt::Display for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accessors shared by every event variant.
///
/// Each accessor is a projection over the raw record and fails with
/// [`Error::MalformedEvent`] when the engine omitted the field.
#[derive(Debug, Clone)]
pub struct EventRecord {
    raw: RawRecord,
}

impl EventRecord {
    #[must_use]
    pub fn new(raw: RawRecord) -> Self {
        Self { raw }
    }

    /// Category discriminant (`Type`).
    pub fn kind(&self) -> Result<&str> {
        self.str_field("Type", "Type")
    }

    pub fn action(&self) -> Result<&str> {
        self.str_field("Action", "Action")
    }

    /// Subject identifier (`Actor.ID`).
    pub fn id(&self) -> Result<&str> {
        self.str_field("Actor/ID", "Actor.ID")
    }

    pub fn attributes(&self) -> Result<&Map<String, Value>> {
        self.raw
            .pointer("Actor/Attributes")
            .and_then(Value::as_object)
            .ok_or(Error::MalformedEvent {
                field: "Actor.Attributes",
            })
    }

    /// Seconds since the epoch.
    pub fn time(&self) -> Result<i64> {
        self.int_field("time", "time")
    }

    /// Nanoseconds since the epoch.
    pub fn time_nano(&self) -> Result<i64> {
        self.int_field("timeNano", "timeNano")
    }

    pub fn timestamp(&self) -> Result<DateTime<Utc>> {
        self.time_nano().map(DateTime::from_timestamp_nanos)
    }

    #[must_use]
    pub fn raw(&self) -> &RawRecord {
        &self.raw
    }

    fn str_field(&self, path: &str, field: &'static str) -> Result<&str> {
        self.raw
            .pointer(path)
            .and_then(Value::as_str)
            .ok_or(Error::MalformedEvent { field })
    }

    fn int_field(&self, path: &str, field: &'static str) -> Result<i64> {
        self.raw
            .pointer(path)
            .and_then(Value::as_i64)
            .ok_or(Error::MalformedEvent { field })
    }
}

/// Shared handle to the one-and-only container detail fetch of an event.
pub type ContainerFetch =
    Shared<BoxFuture<'static, std::result::Result<Arc<ContainerDetails>, InspectError>>>;

/// A container lifecycle event.
pub struct ContainerEvent {
    record: EventRecord,
    inspector: Option<Arc<dyn ContainerInspector>>,
    details: OnceLock<ContainerFetch>,
}

impl ContainerEvent {
    #[must_use]
    pub fn new(record: EventRecord, inspector: Option<Arc<dyn ContainerInspector>>) -> Self {
        Self {
            record,
            inspector,
            details: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn record(&self) -> &EventRecord {
        &self.record
    }

    /// Container name (`Actor.Attributes.name`).
    pub fn name(&self) -> Result<&str> {
        self.record
            .attributes()?
            .get("name")
            .and_then(Value::as_str)
            .ok_or(Error::MalformedEvent {
                field: "Actor.Attributes.name",
            })
    }

    pub fn status(&self) -> Result<&str> {
        self.record.str_field("status", "status")
    }

    /// Inspect the container this event is about.
    ///
    /// The fetch is created on first call and memoized: later and concurrent
    /// callers get a clone of the same shared future, so the engine is asked
    /// at most once per event.
    pub fn container(&self) -> ContainerFetch {
        self.details.get_or_init(|| self.start_fetch()).clone()
    }

    fn start_fetch(&self) -> ContainerFetch {
        let inspector = self.inspector.clone();
        let id = self
            .record
            .id()
            .map(str::to_owned)
            .map_err(|e| InspectError::MissingSubject(e.to_string()));

        async move {
            let inspector = inspector.ok_or(InspectError::Unavailable)?;
            let id = id?;
            debug!(container_id = %id, "Inspecting container");
            inspector.inspect_container(&id).await.map(Arc::new)
        }
        .boxed()
        .shared()
    }
}

impl fmt::Debug for ContainerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerEvent")
            .field("record", &self.record)
            .field("has_inspector", &self.inspector.is_some())
            .field("fetched", &self.details.get().is_some())
            .finish()
    }
}

/// A typed event: one of the known categories or the generic catch-all.
#[derive(Debug)]
pub enum Event {
    Generic(EventRecord),
    Container(ContainerEvent),
}

impl Event {
    /// Wrap a raw record in the variant named by its `Type` field.
    ///
    /// `inspector` backs [`ContainerEvent::container`]; it is ignored for
    /// generic events.
    pub fn classify(
        raw: RawRecord,
        inspector: Option<Arc<dyn ContainerInspector>>,
    ) -> Result<Self> {
        let record = EventRecord::new(raw);
        let kind = record.kind()?;

        match EventClass::from_discriminant(kind) {
            Some(EventClass::Container) => {
                Ok(Self::Container(ContainerEvent::new(record, inspector)))
            }
            Some(EventClass::Any) | None => {
                debug!(
                    kind = %kind,
                    record = ?record.raw().as_map(),
                    "Unrecognized event category"
                );
                Ok(Self::Generic(record))
            }
        }
    }

    #[must_use]
    pub fn class(&self) -> EventClass {
        match self {
            Self::Generic(_) => EventClass::Any,
            Self::Container(_) => EventClass::Container,
        }
    }

    #[must_use]
    pub fn record(&self) -> &EventRecord {
        match self {
            Self::Generic(record) => record,
            Self::Container(event) => event.record(),
        }
    }

    #[must_use]
    pub fn as_container(&self) -> Option<&ContainerEvent> {
        match self {
            Self::Container(event) => Some(event),
            Self::Generic(_) => None,
        }
    }

    pub fn kind(&self) -> Result<&str> {
        self.record().kind()
    }

    pub fn action(&self) -> Result<&str> {
        self.record().action()
    }

    pub fn id(&self) -> Result<&str> {
        self.record().id()
    }

    pub fn attributes(&self) -> Result<&Map<String, Value>> {
        self.record().attributes()
    }

    pub fn time(&self) -> Result<i64> {
        self.record().time()
    }

    pub fn time_nano(&self) -> Result<i64> {
        self.record().time_nano()
    }

    pub fn timestamp(&self) -> Result<DateTime<Utc>> {
        self.record().timestamp()
    }
}
