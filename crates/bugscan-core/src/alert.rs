//! Normalized alerts and per-submission scan results

use crate::risk::{Risk, ToolStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A normalized security alert
///
/// Produced only by the result aggregator; the rest of the client never
/// builds one of these from a raw per-tool payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Short human-readable title
    pub name: String,
    /// Normalized risk level (rendered as a label, never used for sorting)
    pub risk: Risk,
    /// Detailed description
    pub description: String,
    /// Where the issue was found (URL, file, stack frame)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Suggested remediation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    /// Which tool produced the underlying finding
    pub tool: String,
    /// Why the given risk level was assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_explanation: Option<String>,
}

/// Summary of one tool's execution within a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub status: ToolStatus,
    /// Raw status/summary detail from the tool, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// The display-ready outcome of one scan submission
///
/// Owned by the submission workflow for the duration of one
/// request/response cycle; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub target_url: String,
    pub environment: String,
    pub status: String,
    pub job_id: Option<Uuid>,
    /// Always equal to `alerts.len()`; recomputed, never trusted from the wire
    pub alert_count: usize,
    pub alerts: Vec<Alert>,
    /// Per-tool execution summaries, keyed by tool name
    pub per_tool: BTreeMap<String, ToolSummary>,
    /// Top-level error reported by the server, distinct from per-alert entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ScanResult {
    /// Build a result, deriving `alert_count` from the merged list so it
    /// can never disagree with the number of rendered entries.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        target_url: impl Into<String>,
        environment: impl Into<String>,
        status: impl Into<String>,
        job_id: Option<Uuid>,
        alerts: Vec<Alert>,
        per_tool: BTreeMap<String, ToolSummary>,
        error: Option<String>,
    ) -> Self {
        Self {
            target_url: target_url.into(),
            environment: environment.into(),
            status: status.into(),
            job_id,
            alert_count: alerts.len(),
            alerts,
            per_tool,
            error,
            created_at: None,
            completed_at: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == "failed"
    }
}
