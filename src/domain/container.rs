//! Container detail returned by an engine inspect call.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Richer container state fetched on demand for a container event.
///
/// Wraps the engine's inspect document; accessors return `None` when the
/// engine omitted a field instead of failing, since inspect payloads vary
/// between engine versions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ContainerDetails(Value);

impl ContainerDetails {
    #[must_use]
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// Container name without the engine's leading `/`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0
            .get("Name")
            .and_then(Value::as_str)
            .map(|name| name.trim_start_matches('/'))
    }

    /// Image reference the container was created from.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.0
            .pointer("/Config/Image")
            .and_then(Value::as_str)
    }

    /// Lifecycle state such as `running` or `exited`.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.0.pointer("/State/Status").and_then(Value::as_str)
    }

    /// Container labels.
    #[must_use]
    pub fn labels(&self) -> Option<&Map<String, Value>> {
        self.0.pointer("/Config/Labels").and_then(Value::as_object)
    }

    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.0
    }
}
