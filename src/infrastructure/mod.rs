//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! its dispatch logic.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading, validation and logging setup
//! - [`orchestration`] - The watch loop

pub mod config;
pub mod orchestration;
