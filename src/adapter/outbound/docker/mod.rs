//! Container engine adapter.
//!
//! - [`DockerClient`] implements [`ContainerInspector`](crate::port::ContainerInspector)
//! - [`DockerEventStream`] implements [`RecordSource`](crate::port::RecordSource)

pub mod client;
pub mod stream;

pub use client::DockerClient;
pub use stream::DockerEventStream;
