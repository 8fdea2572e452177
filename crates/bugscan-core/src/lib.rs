//! BugScan Core - Foundation types and error handling
//!
//! This crate provides the core abstractions used throughout the BugScan client:
//! - `Alert`: a normalized security finding, merged from heterogeneous tool outputs
//! - `Risk`, `ToolStatus`: severity and per-tool status taxonomies
//! - `Target`, `ScanJob`: scan targets (canonical-URL keyed) and server-owned jobs
//! - `UserProfile`: the authenticated identity owned by the session
//! - `Error`, `Result`: the client-wide error taxonomy

pub mod alert;
pub mod error;
pub mod job;
pub mod risk;
pub mod target;
pub mod user;

// Re-export commonly used types at crate root
pub use alert::{Alert, ScanResult, ToolSummary};
pub use error::{Error, Result};
pub use job::{JobStatus, ScanJob};
pub use risk::{Risk, ToolStatus};
pub use target::{canonicalize_url, AssetValue, Target};
pub use user::UserProfile;
