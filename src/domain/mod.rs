//! Engine-agnostic event model.

pub mod container;
pub mod event;

pub use container::ContainerDetails;
pub use event::{
    ContainerEvent, ContainerFetch, Event, EventClass, EventRecord, RawRecord, CONTAINER_CATEGORY,
};
