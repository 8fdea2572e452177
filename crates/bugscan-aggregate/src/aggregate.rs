//! Merging heterogeneous tool outputs into one display-ready result

use std::collections::BTreeMap;

use bugscan_client::LocalScanResponse;
use bugscan_core::{Error, ScanResult, ToolStatus, ToolSummary};
use tracing::debug;

use crate::adapters::adapter_for;

/// Fold a scan response into a single normalized `ScanResult`.
///
/// Alerts keep their arrival order: severity is rendered as a label,
/// never used for re-sorting. `alert_count` is recomputed from the
/// merged list so it always equals the number of rendered entries,
/// whatever the wire said. A server-reported error stays a top-level
/// field and is never duplicated into the alert list.
pub fn aggregate(response: &LocalScanResponse) -> ScanResult {
    let alerts: Vec<_> = response
        .alerts
        .iter()
        .map(|raw| {
            let tool = raw.tool.as_deref().unwrap_or("unknown");
            adapter_for(tool).adapt(raw, &response.target_url)
        })
        .collect();

    let per_tool: BTreeMap<_, _> = response
        .per_tool_results
        .iter()
        .map(|(name, raw)| {
            let status = ToolStatus::from_raw(raw.status.as_deref().unwrap_or("failed"));
            (
                name.clone(),
                ToolSummary {
                    status,
                    detail: raw.error.clone(),
                },
            )
        })
        .collect();

    debug!(
        target_url = %response.target_url,
        alerts = alerts.len(),
        tools = per_tool.len(),
        status = %response.status,
        "aggregated scan response"
    );

    let mut result = ScanResult::new(
        response.target_url.clone(),
        response
            .environment
            .clone()
            .unwrap_or_else(|| String::from("development")),
        response.status.clone(),
        response.job_id,
        alerts,
        per_tool,
        response.error.clone(),
    );
    result.created_at = response.created_at;
    result.completed_at = response.completed_at;
    result
}

/// Synthesize a local result when no server response was received at
/// all. This is the only place in the client allowed to fabricate a
/// `ScanResult` instead of relaying one from the server.
pub fn network_failure_result(target_url: &str, err: &Error) -> ScanResult {
    debug_assert!(err.is_network());
    ScanResult::new(
        target_url,
        "development",
        "failed",
        None,
        Vec::new(),
        BTreeMap::new(),
        Some(err.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugscan_core::Risk;
    use uuid::Uuid;

    fn response(json: serde_json::Value) -> LocalScanResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_merge_preserves_arrival_order() {
        let res = response(serde_json::json!({
            "job_id": Uuid::new_v4(),
            "status": "completed",
            "target_url": "http://localhost:3001",
            "alerts": [
                { "name": "low first", "risk": "Low", "tool": "semgrep" },
                { "name": "critical second", "risk": "CRITICAL", "tool": "ghauri" },
                { "name": "high third", "risk": "High", "tool": "addresssanitizer" }
            ]
        }));

        let result = aggregate(&res);
        let names: Vec<_> = result.alerts.iter().map(|a| a.name.as_str()).collect();
        // No re-sort by severity
        assert_eq!(names, ["low first", "critical second", "high third"]);
        assert_eq!(result.alerts[1].risk, Risk::Critical);
    }

    #[test]
    fn test_alert_count_recomputed_from_merged_list() {
        let res = response(serde_json::json!({
            "status": "completed",
            "target_url": "http://localhost:3001",
            "alert_count": 99,
            "alerts": [
                { "name": "a", "tool": "semgrep" },
                { "name": "b", "tool": "semgrep" }
            ]
        }));

        let result = aggregate(&res);
        assert_eq!(result.alert_count, 2);
        assert_eq!(result.alert_count, result.alerts.len());
    }

    #[test]
    fn test_skipped_stage_renders_distinctly() {
        let res = response(serde_json::json!({
            "status": "completed",
            "target_url": "http://localhost:3001/product?id=1",
            "alerts": [],
            "results": {
                "addresssanitizer": { "status": "skipped" },
                "ghauri": { "status": "success" }
            }
        }));

        let result = aggregate(&res);
        assert_eq!(result.per_tool["addresssanitizer"].status, ToolStatus::Skipped);
        assert_eq!(result.per_tool["ghauri"].status, ToolStatus::Completed);
        assert_ne!(
            result.per_tool["addresssanitizer"].status,
            result.per_tool["ghauri"].status
        );
    }

    #[test]
    fn test_server_error_not_duplicated_into_alerts() {
        let res = response(serde_json::json!({
            "status": "failed",
            "target_url": "http://localhost:3001",
            "alerts": [],
            "error": "scan container crashed"
        }));

        let result = aggregate(&res);
        assert!(result.is_failed());
        assert_eq!(result.error.as_deref(), Some("scan container crashed"));
        assert!(result.alerts.is_empty());
        assert_eq!(result.alert_count, 0);
    }

    #[test]
    fn test_tool_with_missing_status_counts_as_failed() {
        let res = response(serde_json::json!({
            "status": "completed",
            "target_url": "http://localhost:3001",
            "alerts": [],
            "results": { "ghauri": { "error": "timed out" } }
        }));

        let result = aggregate(&res);
        assert_eq!(result.per_tool["ghauri"].status, ToolStatus::Failed);
        assert_eq!(result.per_tool["ghauri"].detail.as_deref(), Some("timed out"));
    }

    #[test]
    fn test_network_failure_synthesis() {
        let err = Error::Network {
            endpoint: "http://localhost:8000".into(),
            message: "connection refused".into(),
        };
        let result = network_failure_result("http://localhost:3001", &err);

        assert!(result.is_failed());
        assert!(result.alerts.is_empty());
        assert_eq!(result.alert_count, 0);
        assert_eq!(result.job_id, None);
        let msg = result.error.unwrap();
        assert!(msg.contains("backend server is running"));
        assert!(msg.contains("http://localhost:8000"));
    }
}
