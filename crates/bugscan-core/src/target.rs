//! Scan targets and canonical-URL handling

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonicalize a target URL for deduplication: trim surrounding
/// whitespace and strip a single trailing slash.
///
/// This is the only form ever sent to, or compared against, the
/// backend's target list. The operation is idempotent.
pub fn canonicalize_url(url: &str) -> String {
    let trimmed = url.trim();
    match trimmed.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => trimmed.to_string(),
    }
}

/// Business value of the asset behind a target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetValue {
    Critical,
    #[default]
    High,
    Low,
}

impl AssetValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetValue::Critical => "critical",
            AssetValue::High => "high",
            AssetValue::Low => "low",
        }
    }
}

/// A scan target as known to the backend
///
/// At most one target exists per distinct canonical URL per account;
/// the backend is the source of truth and "already exists" is a
/// recoverable condition, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: i64,
    /// Canonical URL (trimmed, single trailing slash stripped)
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub asset_value: Option<AssetValue>,
    pub created_at: DateTime<Utc>,
}
