//! BugScan Aggregate - Tool output normalization
//!
//! Consumes the heterogeneous per-tool result shapes of one scan
//! response and merges them into a single ordered alert list with one
//! risk taxonomy. Each tool gets one adapter; adding a tool means adding
//! an adapter, never touching the aggregation logic.

pub mod adapters;
pub mod aggregate;

pub use adapters::{adapter_for, ToolAdapter};
pub use aggregate::{aggregate, network_failure_result};
