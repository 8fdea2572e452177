//! BugScan Client - HTTP gateway to the backend API
//!
//! This crate is the single point of request construction for the whole
//! client: it owns the configured `reqwest::Client`, injects the bearer
//! token on every outgoing request, and centralizes 401 handling.
//!
//! API endpoints used (all under /api/v1):
//! - GET    /auth/me              - token probe / profile fetch
//! - POST   /auth/login           - form-encoded credential exchange
//! - POST   /auth/register        - account creation (does not authenticate)
//! - PUT    /auth/me              - profile update
//! - POST   /targets              - create target
//! - GET    /targets              - list targets (conflict fallback)
//! - POST   /scans                - create scan job
//! - GET    /scans                - list scan jobs
//! - POST   /scans/local-testing  - localhost scan (extended timeout)
//! - GET    /reports              - list report summaries
//! - GET    /reports/{id}         - fetch one full report

pub mod gateway;
pub mod types;

pub use gateway::{ApiClient, ApiConfig, Route};
pub use types::*;
