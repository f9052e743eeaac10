//! Test utilities shared by unit and integration tests.
//!
//! Available under `#[cfg(test)]` and behind the `testkit` feature so the
//! integration tests in `tests/` can reach the same builders and mocks.

pub mod config;
pub mod inspector;
pub mod record;
pub mod source;
