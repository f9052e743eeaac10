//! Outbound adapters (driven side).

pub mod docker;
pub mod jsonl;
pub mod reconnecting;

pub use docker::{DockerClient, DockerEventStream};
pub use jsonl::JsonLinesSource;
pub use reconnecting::ReconnectingSource;
