//! Risk levels and per-tool status taxonomy

use serde::{Deserialize, Serialize};

/// Risk level for a normalized alert
///
/// Tools report severity under different labels (Semgrep uses
/// WARNING/ERROR, the runtime tools use Low..Critical); everything is
/// folded into this one taxonomy at the aggregation boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Risk {
    /// Informational finding, no direct security impact
    #[default]
    Info,
    /// Low severity, minimal risk
    Low,
    /// Medium severity, moderate risk
    Medium,
    /// High severity, significant risk
    #[serde(alias = "WARNING")]
    High,
    /// Critical severity, immediate action required
    #[serde(alias = "ERROR")]
    Critical,
}

impl Risk {
    /// Fold a raw tool severity label into the normalized taxonomy.
    ///
    /// Unrecognized labels default to `Info` so an unknown tool can never
    /// inflate the apparent risk of a scan.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" | "error" => Risk::Critical,
            "high" | "warning" => Risk::High,
            "medium" | "moderate" => Risk::Medium,
            "low" | "minimal" => Risk::Low,
            _ => Risk::Info,
        }
    }

    /// Numeric value for comparison
    pub fn as_number(&self) -> u8 {
        match self {
            Risk::Info => 0,
            Risk::Low => 1,
            Risk::Medium => 2,
            Risk::High => 3,
            Risk::Critical => 4,
        }
    }

    /// Display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Risk::Info => "Info",
            Risk::Low => "Low",
            Risk::Medium => "Medium",
            Risk::High => "High",
            Risk::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for Risk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Execution status of one scan stage, used for summary badges
///
/// `Skipped` is distinct from `Completed`: a stage that never ran (e.g.
/// the memory-safety tool with no source path) must not render the same
/// as a stage that ran and found nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    /// The stage was not executed at all
    Skipped,
    /// The stage ran to completion without findings
    Completed,
    /// The stage ran to completion and produced findings
    CompletedWithIssues,
    /// The stage started but did not finish
    Failed,
}

impl ToolStatus {
    /// Map a raw per-tool status string from the backend.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "skipped" => ToolStatus::Skipped,
            "success" | "completed" => ToolStatus::Completed,
            "completed_with_issues" => ToolStatus::CompletedWithIssues,
            _ => ToolStatus::Failed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolStatus::Skipped => "skipped",
            ToolStatus::Completed => "completed",
            ToolStatus::CompletedWithIssues => "completed_with_issues",
            ToolStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
