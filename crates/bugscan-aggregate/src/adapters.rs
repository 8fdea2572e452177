//! Per-tool alert adapters
//!
//! Raw payloads differ per tool: the static analyzer labels severity
//! ERROR/WARNING, the memory-safety checker reports stack-trace blocks,
//! the injection prober reports confirmed injection points. One adapter
//! per tool folds its shape into the normalized `Alert`.

use bugscan_client::RawAlert;
use bugscan_core::{Alert, Risk};

/// Maximum evidence excerpt carried into an alert location
const EVIDENCE_EXCERPT: usize = 500;

/// Converts one tool's raw alert shape into the normalized model
pub trait ToolAdapter: Send + Sync {
    /// Canonical tool name, as used in per-tool result keys
    fn tool(&self) -> &'static str;

    /// Normalize one raw alert. `target_url` is the fallback location.
    fn adapt(&self, raw: &RawAlert, target_url: &str) -> Alert;
}

/// Look up the adapter for a tool name. Unknown tools fall back to a
/// generic adapter so a new server-side stage degrades gracefully
/// instead of being dropped.
pub fn adapter_for(tool: &str) -> &'static dyn ToolAdapter {
    match tool {
        "semgrep" => &SemgrepAdapter,
        "addresssanitizer" => &AddressSanitizerAdapter,
        "ghauri" => &GhauriAdapter,
        _ => &GenericAdapter,
    }
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(EVIDENCE_EXCERPT) {
        Some((idx, _)) => trimmed[..idx].to_string(),
        None => trimmed.to_string(),
    }
}

/// Semgrep static analysis
pub struct SemgrepAdapter;

impl ToolAdapter for SemgrepAdapter {
    fn tool(&self) -> &'static str {
        "semgrep"
    }

    fn adapt(&self, raw: &RawAlert, target_url: &str) -> Alert {
        let label = raw.risk.as_deref().unwrap_or("INFO");
        Alert {
            name: raw
                .name
                .clone()
                .unwrap_or_else(|| String::from("Security Issue")),
            risk: Risk::from_label(label),
            description: raw.description.clone().unwrap_or_default(),
            location: raw
                .url
                .clone()
                .or_else(|| Some(target_url.to_string())),
            solution: raw.solution.clone().filter(|s| !s.is_empty()),
            tool: self.tool().to_string(),
            severity_explanation: Some(format!(
                "Semgrep rule severity \"{}\" folded into the shared risk scale",
                label
            )),
        }
    }
}

/// AddressSanitizer memory-safety checker
pub struct AddressSanitizerAdapter;

impl ToolAdapter for AddressSanitizerAdapter {
    fn tool(&self) -> &'static str {
        "addresssanitizer"
    }

    fn adapt(&self, raw: &RawAlert, target_url: &str) -> Alert {
        Alert {
            name: raw
                .name
                .clone()
                .unwrap_or_else(|| String::from("AddressSanitizer memory error")),
            // Memory-safety violations default to High even when the tool
            // reports no label of its own
            risk: raw
                .risk
                .as_deref()
                .map(Risk::from_label)
                .unwrap_or(Risk::High),
            description: raw.description.clone().unwrap_or_else(|| {
                String::from("AddressSanitizer detected a memory safety violation.")
            }),
            // The reported stack trace beats the target URL as a location
            location: raw
                .evidence
                .as_deref()
                .filter(|e| !e.trim().is_empty())
                .map(excerpt)
                .or_else(|| Some(target_url.to_string())),
            solution: raw.solution.clone().filter(|s| !s.is_empty()).or_else(|| {
                Some(String::from(
                    "Investigate the reported stack trace and fix the offending code.",
                ))
            }),
            tool: self.tool().to_string(),
            severity_explanation: Some(String::from(
                "Runtime memory-safety violations are directly exploitable and rated High by default",
            )),
        }
    }
}

/// Ghauri SQL injection prober
pub struct GhauriAdapter;

impl ToolAdapter for GhauriAdapter {
    fn tool(&self) -> &'static str {
        "ghauri"
    }

    fn adapt(&self, raw: &RawAlert, target_url: &str) -> Alert {
        Alert {
            name: raw
                .name
                .clone()
                .unwrap_or_else(|| String::from("SQL Injection (Ghauri)")),
            risk: raw
                .risk
                .as_deref()
                .map(Risk::from_label)
                .unwrap_or(Risk::Critical),
            description: raw.description.clone().unwrap_or_else(|| {
                String::from("Ghauri detected a possible SQL injection.")
            }),
            location: raw
                .url
                .clone()
                .or_else(|| Some(target_url.to_string())),
            solution: raw.solution.clone().filter(|s| !s.is_empty()).or_else(|| {
                Some(String::from(
                    "Use parameterized queries/prepared statements and sanitize all user inputs.",
                ))
            }),
            tool: self.tool().to_string(),
            severity_explanation: Some(String::from(
                "A confirmed injection point exposes the backing database and is rated Critical by default",
            )),
        }
    }
}

/// Fallback for tools without a dedicated adapter
pub struct GenericAdapter;

impl ToolAdapter for GenericAdapter {
    fn tool(&self) -> &'static str {
        "unknown"
    }

    fn adapt(&self, raw: &RawAlert, target_url: &str) -> Alert {
        Alert {
            name: raw
                .name
                .clone()
                .unwrap_or_else(|| String::from("Security Issue")),
            risk: raw
                .risk
                .as_deref()
                .map(Risk::from_label)
                .unwrap_or_default(),
            description: raw.description.clone().unwrap_or_default(),
            location: raw
                .url
                .clone()
                .or_else(|| Some(target_url.to_string())),
            solution: raw.solution.clone().filter(|s| !s.is_empty()),
            tool: raw
                .tool
                .clone()
                .unwrap_or_else(|| self.tool().to_string()),
            severity_explanation: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(tool: &str) -> RawAlert {
        RawAlert {
            tool: Some(tool.into()),
            ..RawAlert::default()
        }
    }

    #[test]
    fn test_semgrep_folds_error_to_critical() {
        let mut r = raw("semgrep");
        r.risk = Some("ERROR".into());
        r.name = Some("buffer-overflow".into());
        let alert = adapter_for("semgrep").adapt(&r, "http://localhost:3001");
        assert_eq!(alert.risk, Risk::Critical);
        assert_eq!(alert.tool, "semgrep");
        assert_eq!(alert.name, "buffer-overflow");
    }

    #[test]
    fn test_semgrep_folds_warning_to_high() {
        let mut r = raw("semgrep");
        r.risk = Some("WARNING".into());
        let alert = adapter_for("semgrep").adapt(&r, "http://localhost:3001");
        assert_eq!(alert.risk, Risk::High);
    }

    #[test]
    fn test_asan_defaults_high_and_prefers_stack_trace() {
        let mut r = raw("addresssanitizer");
        r.evidence = Some("ERROR: AddressSanitizer: heap-buffer-overflow\n #0 main".into());
        let alert = adapter_for("addresssanitizer").adapt(&r, "http://localhost:3001");
        assert_eq!(alert.risk, Risk::High);
        assert!(alert.location.unwrap().contains("heap-buffer-overflow"));
        assert!(alert.solution.is_some());
    }

    #[test]
    fn test_ghauri_defaults_critical() {
        let alert = adapter_for("ghauri").adapt(&raw("ghauri"), "http://localhost:3001/product?id=1");
        assert_eq!(alert.risk, Risk::Critical);
        assert_eq!(alert.location.as_deref(), Some("http://localhost:3001/product?id=1"));
    }

    #[test]
    fn test_unknown_tool_uses_generic_adapter() {
        let mut r = raw("nuclei");
        r.risk = Some("medium".into());
        let alert = adapter_for("nuclei").adapt(&r, "http://localhost:3001");
        assert_eq!(alert.risk, Risk::Medium);
        // The raw tool name is preserved, not replaced by "unknown"
        assert_eq!(alert.tool, "nuclei");
    }

    #[test]
    fn test_evidence_excerpt_is_bounded() {
        let mut r = raw("addresssanitizer");
        r.evidence = Some("x".repeat(5000));
        let alert = adapter_for("addresssanitizer").adapt(&r, "http://localhost:3001");
        assert!(alert.location.unwrap().len() <= 500);
    }
}
