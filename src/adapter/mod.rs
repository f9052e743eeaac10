//! Implementations of ports (hexagonal adapters).
//!
//! - [`outbound`] - Engine client, record sources and the reconnecting wrapper
//! - [`handler`] - Built-in event handlers

pub mod handler;
pub mod outbound;
