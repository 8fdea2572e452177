//! BugScan Session - Authentication lifecycle
//!
//! Owns the session (token + verified user profile) as a single value
//! with an explicit lifecycle: bootstrap at startup, mutate through
//! login/register/refresh/update, teardown on logout or backend
//! rejection. Everything else reads it through `SessionManager`.

pub mod manager;
pub mod store;

pub use manager::{is_synthetic_token, validate_new_password, SessionManager, TEST_TOKEN_PREFIX};
pub use store::{SessionStore, StoredSession};
