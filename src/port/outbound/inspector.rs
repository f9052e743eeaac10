//! Container inspection port.

use async_trait::async_trait;

use crate::domain::container::ContainerDetails;
use crate::error::InspectError;

/// Fetches detailed state for one container.
///
/// Backs the lazy [`ContainerEvent::container`](crate::domain::ContainerEvent::container)
/// lookup. Implementations must be thread-safe; a single event may be read by
/// many handlers at once, but the event guarantees only one call per event.
#[async_trait]
pub trait ContainerInspector: Send + Sync {
    async fn inspect_container(&self, id: &str) -> Result<ContainerDetails, InspectError>;
}
