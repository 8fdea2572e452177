//! Durable session store
//!
//! The token and last-known profile live in one JSON file, replaced
//! atomically (write to a sibling temp file, then rename) so a crash can
//! never leave a token without its matching profile on disk.

use bugscan_core::{Result, UserProfile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What gets persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    /// Last profile verified against the backend for this token
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// File-backed key-value session store
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session. A missing or unreadable file is treated
    /// as "no session", never as an error.
    pub fn load(&self) -> Option<StoredSession> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "discarding corrupt session file");
                None
            }
        }
    }

    /// Persist the session atomically.
    pub fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(session)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Remove any stored session. Succeeds when there is nothing to remove.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> SessionStore {
        let path = std::env::temp_dir()
            .join(format!("bugscan-store-test-{}-{}", name, std::process::id()))
            .join("session.json");
        let store = SessionStore::new(path);
        let _ = store.clear();
        store
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: 1,
            email: "alice@example.com".into(),
            username: "alice".into(),
            role: "user".into(),
            full_name: None,
        }
    }

    #[test]
    fn test_roundtrip() {
        let store = temp_store("roundtrip");
        let session = StoredSession {
            token: "tok-1".into(),
            user: Some(profile()),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));
        store.clear().unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_missing_file_is_no_session() {
        let store = temp_store("missing");
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = temp_store("clear");
        store.clear().unwrap();
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let store = temp_store("corrupt");
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "not json {").unwrap();
        assert_eq!(store.load(), None);
        store.clear().unwrap();
    }
}
