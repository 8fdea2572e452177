//! Session manager: login, registration, bootstrap, refresh, teardown

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use bugscan_client::{ApiClient, ProfileUpdateRequest, RegisterRequest};
use bugscan_core::{Error, Result, UserProfile};
use tracing::{debug, info, warn};

use crate::store::{SessionStore, StoredSession};

/// Reserved prefix for synthetic demo tokens. These authenticate the UI
/// locally but are invalid against the real backend and must never reach
/// a scan-submission endpoint.
pub const TEST_TOKEN_PREFIX: &str = "test-token-";

/// True for locally-recognized placeholder credentials
pub fn is_synthetic_token(token: &str) -> bool {
    token.starts_with(TEST_TOKEN_PREFIX)
}

/// Validate a requested password change before any network call.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<()> {
    if password != confirm {
        return Err(Error::Validation("Passwords do not match".into()));
    }
    if password.len() < 6 {
        return Err(Error::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct SessionState {
    user: Option<UserProfile>,
}

/// Owns the authentication token and current user identity
///
/// Invariant: `user()` returns a profile only when the token has been
/// validated against `/auth/me` at least once since it was last set.
pub struct SessionManager {
    client: Arc<ApiClient>,
    store: SessionStore,
    state: RwLock<SessionState>,
    /// True until `bootstrap` has resolved (exactly once)
    loading: AtomicBool,
    bootstrapped: AtomicBool,
    /// Bumped by every explicit login so an in-flight bootstrap result
    /// can tell it has been overtaken and must discard itself.
    generation: AtomicU64,
}

impl SessionManager {
    pub fn new(client: Arc<ApiClient>, store: SessionStore) -> Self {
        Self {
            client,
            store,
            state: RwLock::new(SessionState::default()),
            loading: AtomicBool::new(true),
            bootstrapped: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    // ── Read interface ───────────────────────────────────────────────────

    pub fn user(&self) -> Option<UserProfile> {
        self.state.read().expect("session lock poisoned").user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// True until the startup token probe has resolved
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// The token a real scan submission may use. Rejects synthetic demo
    /// tokens before any network call and tears the session down, since
    /// the backend would only reject them anyway.
    pub fn require_real_token(&self) -> Result<String> {
        let token = self
            .client
            .token()
            .ok_or_else(|| Error::AuthenticationFailed("Please login to run scans".into()))?;
        if is_synthetic_token(&token) {
            warn!("synthetic test token used for a real scan, clearing session");
            self.teardown();
            return Err(Error::SyntheticToken);
        }
        Ok(token)
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Startup token probe. Runs at most once; always flips the loading
    /// flag to false, whatever the outcome. Network and auth failures
    /// both degrade to "no session" rather than propagating.
    pub async fn bootstrap(&self) {
        if self
            .bootstrapped
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let generation = self.generation.load(Ordering::SeqCst);

        if let Some(stored) = self.store.load() {
            self.client.set_token(&stored.token);
            match self.client.me().await {
                Ok(profile) => {
                    // An explicit login may have completed while the probe
                    // was in flight; its result is authoritative.
                    if self.generation.load(Ordering::SeqCst) == generation {
                        debug!(username = %profile.username, "restored session from stored token");
                        self.apply_profile(stored.token, profile);
                    }
                }
                Err(e) => {
                    if self.generation.load(Ordering::SeqCst) == generation {
                        debug!(code = e.code(), "stored token rejected, clearing session");
                        self.teardown();
                    }
                }
            }
        }

        self.loading.store(false, Ordering::SeqCst);
    }

    /// Exchange credentials for a token, then verify it by fetching the
    /// profile. A token whose profile fetch fails is discarded: a token
    /// without a verified profile is not a valid session.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile> {
        // Overtake any in-flight bootstrap
        self.generation.fetch_add(1, Ordering::SeqCst);

        let token = self.client.login(username.trim(), password).await?;
        self.client.set_token(&token.access_token);

        match self.client.me().await {
            Ok(profile) => {
                info!(username = %profile.username, "login succeeded");
                self.apply_profile(token.access_token, profile.clone());
                Ok(profile)
            }
            Err(e) => {
                warn!(code = e.code(), "profile fetch failed after token exchange, discarding token");
                self.teardown();
                Err(Error::AuthenticationFailed(
                    "Login succeeded but the user profile could not be retrieved. Please try again."
                        .into(),
                ))
            }
        }
    }

    /// Create an account, then log in with the same credentials.
    /// Registration alone does not authenticate.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
        full_name: Option<String>,
    ) -> Result<UserProfile> {
        let req = RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            full_name,
        };
        self.client.register(&req).await?;
        self.login(username, password).await
    }

    /// Clear token and profile unconditionally. No server round-trip.
    pub fn logout(&self) {
        info!("logging out");
        self.teardown();
    }

    /// Re-fetch the profile for the existing token. Failure behaves like
    /// an involuntary logout; whether to navigate is the shell's call.
    pub async fn refresh(&self) -> Result<UserProfile> {
        let token = self
            .client
            .token()
            .ok_or_else(|| Error::Unauthorized(String::from("No active session")))?;
        match self.client.me().await {
            Ok(profile) => {
                self.apply_profile(token, profile.clone());
                Ok(profile)
            }
            Err(e) => {
                warn!(code = e.code(), "session refresh failed, clearing session");
                self.teardown();
                Err(e)
            }
        }
    }

    /// Update the profile and replace it whole, never partially.
    pub async fn update_profile(
        &self,
        email: &str,
        username: &str,
        password: Option<&str>,
    ) -> Result<UserProfile> {
        let token = self
            .client
            .token()
            .ok_or_else(|| Error::Unauthorized(String::from("No active session")))?;
        let req = ProfileUpdateRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: password.map(str::to_string),
        };
        let profile = self.client.update_me(&req).await?;
        self.apply_profile(token, profile.clone());
        Ok(profile)
    }

    // ── Internal state transitions ───────────────────────────────────────

    fn apply_profile(&self, token: String, profile: UserProfile) {
        if let Err(e) = self.store.save(&StoredSession {
            token,
            user: Some(profile.clone()),
        }) {
            warn!(code = e.code(), "failed to persist session");
        }
        self.state.write().expect("session lock poisoned").user = Some(profile);
    }

    fn teardown(&self) {
        self.client.clear_token();
        if let Err(e) = self.store.clear() {
            warn!(code = e.code(), "failed to clear session store");
        }
        self.state.write().expect("session lock poisoned").user = None;
    }
}
