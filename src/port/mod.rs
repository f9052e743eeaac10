//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams between the dispatch engine and the container engine
//! it watches. Adapters implement them; tests swap in the doubles from
//! [`testkit`](crate::testkit).
//!
//! ```text
//!                 ┌──────────────────────────┐
//!                 │       Application        │
//!                 │  registry / dispatcher   │
//!                 └────────────┬─────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//!      ┌───────────────┐               ┌────────────────────┐
//!      │ RecordSource  │               │ ContainerInspector │
//!      └───────────────┘               └────────────────────┘
//! ```

pub mod outbound;

pub use outbound::inspector::ContainerInspector;
pub use outbound::source::RecordSource;
