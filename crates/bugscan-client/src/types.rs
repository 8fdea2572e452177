//! Wire types for the backend API

use bugscan_core::AssetValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Response from POST /auth/login
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Request body for POST /auth/register
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Request body for PUT /auth/me
///
/// `password` is only serialized when a change was requested.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdateRequest {
    pub email: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Request body for POST /targets
#[derive(Debug, Clone, Serialize)]
pub struct TargetCreateRequest {
    /// Canonical URL (trimmed, single trailing slash stripped)
    pub url: String,
    pub name: String,
    pub asset_value: AssetValue,
}

/// Request body for POST /scans
#[derive(Debug, Clone, Serialize)]
pub struct ScanCreateRequest {
    pub target_id: i64,
}

/// Request body for POST /scans/local-testing
#[derive(Debug, Clone, Serialize)]
pub struct LocalScanRequest {
    pub target_url: String,
    pub label: String,
    /// Host path to the source tree for the memory-safety stage. Passed
    /// through unvalidated; when absent the stage is skipped server-side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

/// One raw alert as emitted by a tool, before normalization
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAlert {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub risk: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
}

/// Raw per-tool execution summary
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawToolResult {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_count: Option<u32>,
}

/// Response from POST /scans/local-testing
#[derive(Debug, Clone, Deserialize)]
pub struct LocalScanResponse {
    #[serde(default)]
    pub job_id: Option<Uuid>,
    pub status: String,
    pub target_url: String,
    #[serde(default)]
    pub environment: Option<String>,
    /// Advisory only; the aggregator recounts the merged list
    #[serde(default)]
    pub alert_count: Option<usize>,
    #[serde(default)]
    pub alerts: Vec<RawAlert>,
    #[serde(default, alias = "results")]
    pub per_tool_results: BTreeMap<String, RawToolResult>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Summary entry from GET /reports
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSummary {
    pub job_id: Uuid,
    pub target_url: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub findings_count: usize,
    #[serde(default)]
    pub findings_summary: serde_json::Value,
}

/// Full report from GET /reports/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct FullReport {
    pub job_id: Uuid,
    pub target_url: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub findings: Vec<serde_json::Value>,
    #[serde(default)]
    pub stages: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_scan_request_omits_absent_source_path() {
        let req = LocalScanRequest {
            target_url: "http://localhost:3001".into(),
            label: "LocalHostTesting".into(),
            source_path: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("source_path").is_none());
    }

    #[test]
    fn test_local_scan_response_accepts_results_alias() {
        let res: LocalScanResponse = serde_json::from_value(serde_json::json!({
            "status": "completed",
            "target_url": "http://localhost:3001",
            "alerts": [],
            "results": {
                "addresssanitizer": { "status": "skipped" },
                "ghauri": { "status": "success" }
            }
        }))
        .unwrap();
        assert_eq!(res.per_tool_results.len(), 2);
        assert_eq!(
            res.per_tool_results["addresssanitizer"].status.as_deref(),
            Some("skipped")
        );
    }

    #[test]
    fn test_profile_update_omits_unchanged_password() {
        let req = ProfileUpdateRequest {
            email: "a@b.c".into(),
            username: "alice".into(),
            password: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("password").is_none());
    }
}
