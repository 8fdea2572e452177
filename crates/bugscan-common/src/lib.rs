//! BugScan Common - Shared utilities: configuration and logging
//!
//! This crate provides the ambient services used across all BugScan crates.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigBuilder};
pub use logging::init_logging;
