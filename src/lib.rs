//! Swarmwatch - React to container lifecycle events with typed handlers.
//!
//! The crate starts a pool of shared, typed resources ("fixtures") in
//! dependency order without an explicit dependency graph, matches handlers
//! to events and fixtures purely by declared type, and fans every event out
//! to all eligible handlers concurrently while isolating failures.
//!
//! # Architecture
//!
//! ```text
//! RecordSource ──► Registry::dispatch ──► Event::classify ──► handlers (join_all)
//!                        ▲                                      ▲
//!                        └──────────── FixturePool ─────────────┘
//!                                 (resolve_fixtures at boot,
//!                                  drained by shutdown)
//! ```
//!
//! # Modules
//!
//! - [`domain`] - Events, event classes and container details
//! - [`application`] - Capabilities, fixtures, the registry and its runners
//! - [`port`] - Traits for record sources and container inspection
//! - [`adapter`] - Engine client, JSON-lines replay, reconnection, built-in handlers
//! - [`infrastructure`] - Configuration, logging and the watch loop
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use swarmwatch::application::{Capabilities, Handler, Registry};
//! use swarmwatch::domain::EventClass;
//!
//! let mut registry = Registry::new();
//! registry.add_handler(Handler::new(
//!     "on-container",
//!     Capabilities::new().event_of("event", EventClass::Container),
//!     |args| async move {
//!         let event = args.event("event")?;
//!         if let Some(container) = event.as_container() {
//!             let details = container.container().await?;
//!             println!("{:?} is {:?}", details.name(), details.state());
//!         }
//!         Ok(())
//!     },
//! ));
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
