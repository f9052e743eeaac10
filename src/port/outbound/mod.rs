//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the engine-facing dependencies of the watcher:
//! the live record feed and on-demand container inspection.

pub mod inspector;
pub mod source;
