//! The submission workflow: resolve a target, then create a scan

use std::sync::{Arc, RwLock};

use bugscan_aggregate::{aggregate, network_failure_result};
use bugscan_client::{
    ApiClient, LocalScanRequest, ScanCreateRequest, TargetCreateRequest,
};
use bugscan_core::{
    canonicalize_url, AssetValue, Error, Result, ScanJob, ScanResult, Target,
};
use bugscan_session::SessionManager;
use tracing::{debug, info, warn};

use crate::validate::{validate_local_url, validate_target_url};

/// Label attached to localhost-testing targets created by this client
const LOCAL_SCAN_LABEL: &str = "LocalHostTesting";

/// Where one submission currently stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    ResolvingTarget,
    CreatingScan,
    Success,
    Failed,
}

/// Drives one submission at a time: target resolution strictly precedes
/// scan creation. Concurrent submissions are not coordinated against
/// each other; the backend's target-conflict response is the de facto
/// concurrency guard.
pub struct SubmissionWorkflow {
    client: Arc<ApiClient>,
    session: Arc<SessionManager>,
    app_origin: Option<String>,
    phase: RwLock<SubmissionPhase>,
}

impl SubmissionWorkflow {
    pub fn new(
        client: Arc<ApiClient>,
        session: Arc<SessionManager>,
        app_origin: Option<String>,
    ) -> Self {
        Self {
            client,
            session,
            app_origin,
            phase: RwLock::new(SubmissionPhase::Idle),
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        *self.phase.read().expect("phase lock poisoned")
    }

    fn set_phase(&self, phase: SubmissionPhase) {
        debug!(?phase, "submission phase");
        *self.phase.write().expect("phase lock poisoned") = phase;
    }

    // ── Full-pipeline submission ─────────────────────────────────────────

    /// Submit a scan for a target URL. Creates (or reuses) the target,
    /// then creates a new scan job referencing it. Re-submitting the same
    /// canonical URL reuses the target but always yields a fresh job.
    pub async fn submit_scan(&self, url: &str) -> Result<ScanJob> {
        let outcome = self.run_submission(url).await;
        match &outcome {
            Ok(job) => {
                self.set_phase(SubmissionPhase::Success);
                info!(job_id = %job.job_id, "scan job created");
            }
            Err(e) => {
                self.set_phase(SubmissionPhase::Failed);
                warn!(code = e.code(), "scan submission failed");
            }
        }
        outcome
    }

    async fn run_submission(&self, url: &str) -> Result<ScanJob> {
        let canonical = validate_target_url(url)?;
        self.session.require_real_token()?;

        self.set_phase(SubmissionPhase::ResolvingTarget);
        let target = self.resolve_target(&canonical).await?;

        self.set_phase(SubmissionPhase::CreatingScan);
        self.client
            .create_scan(&ScanCreateRequest {
                target_id: target.id,
            })
            .await
    }

    /// Create the target, recovering from an "already exists" conflict
    /// through exactly one list-and-match fallback. A conflict whose URL
    /// is absent from the account's own list means the clashing target
    /// belongs to someone else; that fails with an error naming the URL
    /// instead of retrying.
    async fn resolve_target(&self, canonical: &str) -> Result<Target> {
        let req = TargetCreateRequest {
            url: canonical.to_string(),
            name: canonical.to_string(),
            asset_value: AssetValue::High,
        };

        match self.client.create_target(&req).await {
            Ok(target) => Ok(target),
            Err(e) if is_target_conflict(&e) => {
                debug!(url = canonical, "target exists, falling back to list-and-match");
                recover_conflict(self.client.list_targets().await, canonical)
            }
            Err(e) => Err(e),
        }
    }

    // ── Localhost-testing submission ─────────────────────────────────────

    /// Submit a localhost-testing scan. All validation happens before any
    /// network I/O; when the backend is unreachable the aggregator
    /// synthesizes a failed result instead of erroring out.
    pub async fn submit_local_scan(
        &self,
        url: &str,
        source_path: Option<String>,
    ) -> Result<ScanResult> {
        let canonical = validate_local_url(url, self.app_origin.as_deref())?;
        self.session.require_real_token()?;

        self.set_phase(SubmissionPhase::CreatingScan);
        let req = LocalScanRequest {
            target_url: canonical.clone(),
            label: LOCAL_SCAN_LABEL.to_string(),
            source_path,
        };

        let result = match self.client.local_testing_scan(&req).await {
            Ok(response) => aggregate(&response),
            Err(e) if e.is_network() => {
                warn!(code = e.code(), "no response from backend, synthesizing failed result");
                network_failure_result(&canonical, &e)
            }
            Err(e) => {
                self.set_phase(SubmissionPhase::Failed);
                return Err(e);
            }
        };

        self.set_phase(if result.is_failed() {
            SubmissionPhase::Failed
        } else {
            SubmissionPhase::Success
        });
        Ok(result)
    }
}

/// True for the 400 the backend raises when the target URL is taken
pub(crate) fn is_target_conflict(err: &Error) -> bool {
    match err {
        Error::Api { status: 400, detail } => {
            detail.contains("already exists") || detail.contains("Target URL")
        }
        _ => false,
    }
}

/// Resolve a creation conflict from the account's own target list. A
/// miss and a failed list call both collapse to the conflict error
/// naming the URL; there is never a second attempt.
pub(crate) fn recover_conflict(
    listed: Result<Vec<Target>>,
    canonical: &str,
) -> Result<Target> {
    let conflict = || Error::TargetConflict {
        url: canonical.to_string(),
    };
    match listed {
        Ok(targets) => match_existing_target(&targets, canonical)
            .cloned()
            .ok_or_else(conflict),
        Err(e) => {
            warn!(code = e.code(), "conflict fallback list failed");
            Err(conflict())
        }
    }
}

/// Match a canonical URL against the account's target list
pub(crate) fn match_existing_target<'a>(
    targets: &'a [Target],
    canonical: &str,
) -> Option<&'a Target> {
    targets
        .iter()
        .find(|t| canonicalize_url(&t.url) == canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugscan_client::ApiConfig;
    use bugscan_session::SessionStore;
    use chrono::Utc;
    use std::time::Duration;

    fn target(id: i64, url: &str) -> Target {
        Target {
            id,
            url: url.into(),
            name: None,
            description: None,
            asset_value: None,
            created_at: Utc::now(),
        }
    }

    fn workflow(token: &str, app_origin: Option<&str>) -> SubmissionWorkflow {
        let client = Arc::new(
            ApiClient::new(ApiConfig {
                base_url: "http://127.0.0.1:1".into(),
                request_timeout: Duration::from_secs(5),
                ..ApiConfig::default()
            })
            .unwrap(),
        );
        client.set_token(token);
        let store = SessionStore::new(
            std::env::temp_dir()
                .join(format!("bugscan-workflow-test-{}", std::process::id()))
                .join("session.json"),
        );
        let session = Arc::new(SessionManager::new(Arc::clone(&client), store));
        SubmissionWorkflow::new(client, session, app_origin.map(str::to_string))
    }

    #[test]
    fn test_conflict_detection() {
        assert!(is_target_conflict(&Error::Api {
            status: 400,
            detail: "Target URL 'http://x' already exists".into(),
        }));
        assert!(is_target_conflict(&Error::Api {
            status: 400,
            detail: "Target URL is taken".into(),
        }));
        assert!(!is_target_conflict(&Error::Api {
            status: 400,
            detail: "malformed url".into(),
        }));
        assert!(!is_target_conflict(&Error::Api {
            status: 500,
            detail: "already exists".into(),
        }));
        assert!(!is_target_conflict(&Error::Unauthorized(
            "Session rejected by the backend".into()
        )));
    }

    #[test]
    fn test_fallback_matches_by_canonical_equality() {
        let targets = vec![
            target(1, "http://other.example.com"),
            // Stored with a trailing slash the canonical form strips
            target(2, "http://example.com/"),
        ];
        let hit = match_existing_target(&targets, "http://example.com").unwrap();
        assert_eq!(hit.id, 2);
    }

    #[test]
    fn test_fallback_miss_returns_none() {
        let targets = vec![target(1, "http://other.example.com")];
        assert!(match_existing_target(&targets, "http://example.com").is_none());
    }

    #[test]
    fn test_fallback_miss_reports_conflict_naming_url() {
        let err = recover_conflict(Ok(vec![target(1, "http://other.example.com")]), "http://example.com")
            .unwrap_err();
        match err {
            Error::TargetConflict { url } => assert_eq!(url, "http://example.com"),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_fallback_list_still_reports_conflict() {
        // The list call dying must not surface a raw transport error in
        // place of the descriptive conflict message.
        let listed = Err(Error::Network {
            endpoint: "http://127.0.0.1:1".into(),
            message: "connection refused".into(),
        });
        let err = recover_conflict(listed, "http://example.com").unwrap_err();
        match err {
            Error::TargetConflict { url } => assert_eq!(url, "http://example.com"),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_synthetic_token_rejected_before_any_network_call() {
        // The backend is unreachable: a network error would prove a
        // request was attempted. SyntheticToken proves rejection came first.
        let wf = workflow("test-token-demo", None);
        let err = wf
            .submit_local_scan("http://localhost:3001", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SyntheticToken));
    }

    #[tokio::test]
    async fn test_synthetic_token_also_blocks_full_pipeline() {
        let wf = workflow("test-token-demo", None);
        let err = wf.submit_scan("http://example.com").await.unwrap_err();
        assert!(matches!(err, Error::SyntheticToken));
        assert_eq!(wf.phase(), SubmissionPhase::Failed);
    }

    #[tokio::test]
    async fn test_self_scan_rejected_before_any_network_call() {
        let wf = workflow("real-token", Some("http://localhost:3001"));
        let err = wf
            .submit_local_scan("http://localhost:3001/", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SelfScan { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_yields_synthesized_failure() {
        let wf = workflow("real-token", None);
        let result = wf
            .submit_local_scan("http://localhost:3001", None)
            .await
            .unwrap();

        assert!(result.is_failed());
        assert!(result.alerts.is_empty());
        assert_eq!(result.alert_count, 0);
        assert!(result.error.unwrap().contains("backend server is running"));
        assert_eq!(wf.phase(), SubmissionPhase::Failed);
    }

    #[tokio::test]
    async fn test_full_pipeline_fails_with_network_error_when_unreachable() {
        // Unlike the localhost flow, the full pipeline has no synthesized
        // result: the network error propagates to the caller.
        let wf = workflow("real-token", None);
        let err = wf.submit_scan("http://example.com").await.unwrap_err();
        assert!(err.is_network());
        assert_eq!(wf.phase(), SubmissionPhase::Failed);
    }
}
