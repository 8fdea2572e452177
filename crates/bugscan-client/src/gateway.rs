//! The HTTP gateway: one configured client for every backend call

use std::sync::{Arc, RwLock};
use std::time::Duration;

use bugscan_core::{Error, Result, ScanJob, Target, UserProfile};
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::types::{
    FullReport, LocalScanRequest, LocalScanResponse, ProfileUpdateRequest, RegisterRequest,
    ReportSummary, ScanCreateRequest, TargetCreateRequest, TokenResponse,
};

/// Configuration for the API gateway
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend base URL (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Default request timeout. Long on purpose: downstream tools
    /// (memory-safety and injection scanners) can run for minutes.
    pub request_timeout: Duration,
    /// Timeout for the scan-submission call path, longer than the default
    pub scan_timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:8000"),
            request_timeout: Duration::from_secs(300),
            scan_timeout: Duration::from_secs(600),
            user_agent: format!("BugScan-Client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Navigational location of the hosting shell
///
/// The gateway only needs to know whether the current route is an
/// unauthenticated entry point: a 401 on those routes must propagate to
/// the page instead of triggering the unauthorized hook, otherwise a
/// failed login would redirect-loop back to itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Login,
    Register,
    Dashboard,
    LocalTesting,
    Scans,
    Reports,
    Profile,
}

impl Route {
    /// True for entry points reachable without a session
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

type UnauthorizedHook = dyn Fn() + Send + Sync;

/// HTTP gateway to the BugScan backend
///
/// Detection is separated from effect: the gateway classifies a 401 as
/// `Error::Unauthorized` and fires the registered hook; clearing the
/// session and navigating is the hosting shell's job.
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
    token: RwLock<Option<String>>,
    route: RwLock<Route>,
    on_unauthorized: RwLock<Option<Arc<UnauthorizedHook>>>,
}

impl ApiClient {
    /// Create a new gateway
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http,
            token: RwLock::new(None),
            route: RwLock::new(Route::default()),
            on_unauthorized: RwLock::new(None),
        })
    }

    /// Backend base URL this gateway points at
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the API URL with the versioned prefix
    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.config.base_url.trim_end_matches('/'), path)
    }

    // ── Token & route state ──────────────────────────────────────────────

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().expect("token lock poisoned") = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self.token.write().expect("token lock poisoned") = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().expect("token lock poisoned").clone()
    }

    /// Record the shell's current route so 401 handling can tell entry
    /// points apart from authenticated pages.
    pub fn set_route(&self, route: Route) {
        *self.route.write().expect("route lock poisoned") = route;
    }

    pub fn route(&self) -> Route {
        *self.route.read().expect("route lock poisoned")
    }

    /// Register the handler invoked when a 401 arrives outside the
    /// unauthenticated entry points.
    pub fn on_unauthorized(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self
            .on_unauthorized
            .write()
            .expect("hook lock poisoned") = Some(Arc::new(hook));
    }

    /// Fire the registered unauthorized hook, subject to the
    /// public-route rule. Called by the request path on every 401.
    pub fn notify_unauthorized(&self) {
        let route = self.route();
        if route.is_public() {
            // Let the login/register page render its own message
            debug!(?route, "401 on public route, propagating without hook");
            return;
        }
        let hook = self
            .on_unauthorized
            .read()
            .expect("hook lock poisoned")
            .clone();
        if let Some(hook) = hook {
            warn!(?route, "session rejected by backend, firing unauthorized hook");
            hook();
        }
    }

    // ── Request plumbing ─────────────────────────────────────────────────

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn execute<T: serde::de::DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        self.execute_with_timeout(req, self.config.request_timeout)
            .await
    }

    async fn execute_with_timeout<T: serde::de::DeserializeOwned>(
        &self,
        req: RequestBuilder,
        timeout: Duration,
    ) -> Result<T> {
        let res = self
            .authorized(req)
            .send()
            .await
            .map_err(|e| self.classify_transport(e, timeout))?;

        let status = res.status();
        if status == StatusCode::UNAUTHORIZED {
            let body = res.text().await.unwrap_or_default();
            self.notify_unauthorized();
            return Err(Error::Unauthorized(unauthorized_detail(&body)));
        }

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                detail: extract_detail(&body),
            });
        }

        res.json::<T>()
            .await
            .map_err(|e| Error::Internal(format!("Malformed response body: {}", e)))
    }

    /// Classify a transport-level failure: no response was received, so
    /// the caller gets a network diagnosis instead of a generic message.
    /// `timeout` is the effective limit for this call (the scan path
    /// overrides the default).
    fn classify_transport(&self, err: reqwest::Error, timeout: Duration) -> Error {
        if err.is_timeout() {
            return Error::Timeout {
                seconds: timeout.as_secs(),
            };
        }
        Error::Network {
            endpoint: self.config.base_url.clone(),
            message: err.to_string(),
        }
    }

    // ── Auth ─────────────────────────────────────────────────────────────

    /// Token probe / profile fetch (GET /auth/me)
    pub async fn me(&self) -> Result<UserProfile> {
        self.execute(self.http.get(self.api_url("/auth/me"))).await
    }

    /// Exchange credentials for a token (POST /auth/login)
    ///
    /// The login endpoint expects form-encoded data, unlike the JSON
    /// content type used everywhere else.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let form = [("username", username), ("password", password)];
        self.execute(self.http.post(self.api_url("/auth/login")).form(&form))
            .await
    }

    /// Create an account (POST /auth/register). Does not authenticate.
    pub async fn register(&self, req: &RegisterRequest) -> Result<UserProfile> {
        self.execute(self.http.post(self.api_url("/auth/register")).json(req))
            .await
    }

    /// Update the current user's profile (PUT /auth/me)
    pub async fn update_me(&self, req: &ProfileUpdateRequest) -> Result<UserProfile> {
        self.execute(self.http.put(self.api_url("/auth/me")).json(req))
            .await
    }

    // ── Targets ──────────────────────────────────────────────────────────

    /// Create a target (POST /targets). A 400 whose detail mentions
    /// "already exists" signals a conflict the workflow recovers from.
    pub async fn create_target(&self, req: &TargetCreateRequest) -> Result<Target> {
        self.execute(self.http.post(self.api_url("/targets")).json(req))
            .await
    }

    /// List the account's targets (GET /targets)
    pub async fn list_targets(&self) -> Result<Vec<Target>> {
        self.execute(self.http.get(self.api_url("/targets"))).await
    }

    // ── Scans ────────────────────────────────────────────────────────────

    /// Create a scan job for a resolved target (POST /scans)
    pub async fn create_scan(&self, req: &ScanCreateRequest) -> Result<ScanJob> {
        self.execute(self.http.post(self.api_url("/scans")).json(req))
            .await
    }

    /// List the account's scan jobs (GET /scans)
    pub async fn list_scans(&self) -> Result<Vec<ScanJob>> {
        self.execute(self.http.get(self.api_url("/scans"))).await
    }

    /// Submit a localhost scan (POST /scans/local-testing)
    ///
    /// Uses the extended scan timeout: the memory-safety and injection
    /// stages regularly outlive the default.
    pub async fn local_testing_scan(&self, req: &LocalScanRequest) -> Result<LocalScanResponse> {
        let builder = self
            .http
            .post(self.api_url("/scans/local-testing"))
            .timeout(self.config.scan_timeout)
            .json(req);
        self.execute_with_timeout(builder, self.config.scan_timeout)
            .await
    }

    // ── Reports ──────────────────────────────────────────────────────────

    /// List report summaries (GET /reports)
    pub async fn list_reports(&self) -> Result<Vec<ReportSummary>> {
        self.execute(self.http.get(self.api_url("/reports"))).await
    }

    /// Fetch one full report (GET /reports/{id})
    pub async fn get_report(&self, job_id: Uuid) -> Result<FullReport> {
        self.execute(self.http.get(self.api_url(&format!("/reports/{}", job_id))))
            .await
    }
}

/// Pull the human-readable message out of a FastAPI-style error body
/// (`{"detail": "..."}`), falling back to the raw text.
fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }
    body.to_string()
}

/// Detail message for a 401, e.g. "Incorrect username or password" on
/// the login page. Falls back to a generic message when the body
/// carries none.
fn unauthorized_detail(body: &str) -> String {
    let detail = extract_detail(body);
    if detail.trim().is_empty() {
        String::from("Session rejected by the backend")
    } else {
        detail
    }
}
