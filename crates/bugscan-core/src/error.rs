//! Error types for the BugScan client

use thiserror::Error;

/// Result type alias using BugScan Error
pub type Result<T> = std::result::Result<T, Error>;

/// BugScan client error taxonomy
///
/// Validation and network failures are handled at the call site,
/// authentication failures centrally by the HTTP gateway; everything
/// else propagates to the workflow step that issued the request.
#[derive(Error, Debug)]
pub enum Error {
    // === Validation (rejected before any network call) ===
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Self-scan rejected: {url} is the application's own origin")]
    SelfScan { url: String },

    #[error("Test accounts cannot run scans. Please login with a registered account.")]
    SyntheticToken,

    // === Authentication ===
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// 401 from the backend; carries the server's detail message so the
    /// login page can render it verbatim
    #[error("{0}")]
    Unauthorized(String),

    // === Target resolution ===
    #[error("Target URL \"{url}\" already exists and is not owned by this account. Use a different URL or select it from your targets.")]
    TargetConflict { url: String },

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    // === Transport ===
    #[error("Network error: {message}. Please ensure the backend server is running on {endpoint}")]
    Network { endpoint: String, message: String },

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    // === Serialization ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Configuration ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    // === IO (session store, config files) ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the failure happened before a response was received
    /// (connection refused, DNS, timeout). These get a remediation hint
    /// rather than a generic message.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network { .. } | Error::Timeout { .. })
    }

    /// True when the session must be cleared and the user sent back to login.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Error::Unauthorized(_) | Error::AuthenticationFailed(_) | Error::SyntheticToken
        )
    }

    /// True when the error was raised by client-side validation, before
    /// any network I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::SelfScan { .. } | Error::SyntheticToken
        )
    }

    /// Get an error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION",
            Error::SelfScan { .. } => "SELF_SCAN",
            Error::SyntheticToken => "SYNTHETIC_TOKEN",
            Error::AuthenticationFailed(_) => "AUTH_FAILED",
            Error::Unauthorized(_) => "UNAUTHORIZED",
            Error::TargetConflict { .. } => "TARGET_CONFLICT",
            Error::TargetNotFound(_) => "TARGET_NOT_FOUND",
            Error::Network { .. } => "NETWORK_ERROR",
            Error::Timeout { .. } => "TIMEOUT",
            Error::Api { .. } => "API_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let net = Error::Network {
            endpoint: "http://localhost:8000".into(),
            message: "connection refused".into(),
        };
        assert!(net.is_network());
        assert!(!net.is_auth());

        assert!(Error::Unauthorized("Incorrect username or password".into()).is_auth());
        assert!(Error::SyntheticToken.is_auth());
        assert!(Error::SyntheticToken.is_validation());

        let conflict = Error::TargetConflict {
            url: "http://example.com".into(),
        };
        assert!(!conflict.is_auth());
        assert_eq!(conflict.code(), "TARGET_CONFLICT");
    }

    #[test]
    fn test_unauthorized_renders_server_detail() {
        let err = Error::Unauthorized("Incorrect username or password".into());
        assert_eq!(err.to_string(), "Incorrect username or password");
    }

    #[test]
    fn test_conflict_message_names_url() {
        let err = Error::TargetConflict {
            url: "http://example.com".into(),
        };
        assert!(err.to_string().contains("http://example.com"));
    }

    #[test]
    fn test_network_message_carries_remediation_hint() {
        let err = Error::Network {
            endpoint: "http://localhost:8000".into(),
            message: "connection refused".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("backend server is running"));
        assert!(msg.contains("http://localhost:8000"));
    }
}
