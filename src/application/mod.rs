//! Application services: the fixture and dispatch engine.
//!
//! - [`capability`] - parameter descriptors and type-based argument matching
//! - [`fixture`] - fixture factories, scoped resources and the fixture pool
//! - [`handler`] - event handlers and startup hooks
//! - [`registry`] - registration and lifecycle entry points
//!
//! Resolution, dispatch and the startup/shutdown passes are internal to the
//! registry and exposed only through it.

pub mod capability;
mod dispatch;
pub mod fixture;
pub mod handler;
mod lifecycle;
pub mod registry;
pub mod report;
mod resolver;

pub use capability::{
    resolve_args, Args, Candidate, Capabilities, FixtureType, FixtureValue, Requirement,
    Resolution, Slot,
};
pub use fixture::{Fixture, FixturePool, Resource};
pub use handler::{Handler, StartupHook};
pub use registry::Registry;
pub use report::{Failure, RunReport};
