//! Mock [`ContainerInspector`] that counts engine calls.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use crate::domain::container::ContainerDetails;
use crate::error::InspectError;
use crate::port::outbound::inspector::ContainerInspector;

/// Answers every inspect with a minimal document named after the id, and
/// counts how many times it was asked.
///
/// Yields once before answering so concurrent readers genuinely overlap.
#[derive(Debug, Default)]
pub struct CountingInspector {
    calls: AtomicUsize,
}

impl CountingInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerInspector for CountingInspector {
    async fn inspect_container(&self, id: &str) -> Result<ContainerDetails, InspectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(ContainerDetails::new(json!({
            "Id": id,
            "Name": format!("/{id}"),
            "State": { "Status": "running" }
        })))
    }
}
