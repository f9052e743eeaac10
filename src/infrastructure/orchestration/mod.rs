//! Watch loop orchestration.
//!
//! Binds the registry to a record source and runs it from fixture startup
//! to the final drain.

mod runtime;
pub mod watcher;

pub use watcher::{WatchSummary, Watcher};
