//! Per-browser auth sessions.
//!
//! ARCHITECTURE
//! ============
//! Each browser gets an opaque session token (HttpOnly cookie) mapping to an
//! `AuthSession` held in process memory. Handlers receive the session as an
//! explicit context object and lock it for the whole request, so duplicate
//! callbacks for one browser run one after the other.
//!
//! TRADE-OFFS
//! ==========
//! Nothing is persisted: a restart logs everyone out. Idle sessions are
//! evicted by a sweeper task instead of on every lookup.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

use super::provider::{TokenSet, UserInfo};

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// PKCE
// =============================================================================

/// S256 challenge for a PKCE verifier (RFC 7636 §4.2).
#[must_use]
pub fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Generate a fresh `(verifier, challenge)` pair. The verifier is 43 chars
/// of base64url, the minimum length the RFC allows.
#[must_use]
pub fn generate_pkce() -> (String, String) {
    let bytes: [u8; 32] = rand::rng().random();
    let verifier = URL_SAFE_NO_PAD.encode(bytes);
    let challenge = pkce_challenge(&verifier);
    (verifier, challenge)
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// What the pages render from.
#[derive(Debug, Clone, Default)]
pub struct SessionView {
    pub logged_in: bool,
    pub userinfo: UserInfo,
    /// `None` and `Some("")` both mean no error.
    pub error_message: Option<String>,
}

impl SessionView {
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error_message.as_deref().is_some_and(|m| !m.is_empty())
    }

    #[must_use]
    pub fn error_text(&self) -> &str {
        self.error_message.as_deref().unwrap_or_default()
    }

    /// Display name for the greeting; `"User"` when the claim is absent or not a string.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.userinfo
            .get("name")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("User")
    }
}

/// A hosted login that has been started but not yet finalized.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub state: String,
    pub code_verifier: String,
}

#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    pub view: SessionView,
    pub pending: Option<PendingLogin>,
    pub tokens: Option<TokenSet>,
}

pub type SessionHandle = Arc<Mutex<AuthSession>>;

// =============================================================================
// STORE
// =============================================================================

struct SessionEntry {
    session: SessionHandle,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionEntry>>>,
    idle: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())), idle }
    }

    /// Look up the session for `token`, creating a fresh one when the token is
    /// missing or unknown. Returns the (possibly new) token, the session, and
    /// whether it was created.
    pub async fn get_or_create(&self, token: Option<&str>) -> (String, SessionHandle, bool) {
        let mut sessions = self.inner.write().await;
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            if let Some(entry) = sessions.get_mut(token) {
                entry.last_seen = Instant::now();
                return (token.to_owned(), Arc::clone(&entry.session), false);
            }
        }

        let token = generate_token();
        let session: SessionHandle = Arc::new(Mutex::new(AuthSession::default()));
        sessions.insert(token.clone(), SessionEntry { session: Arc::clone(&session), last_seen: Instant::now() });
        (token, session, true)
    }

    /// Move the session under `old` to a freshly generated token so a token
    /// handed out before login never identifies the logged-in user. Returns
    /// `None` when `old` is no longer in the store.
    pub async fn rotate(&self, old: &str) -> Option<String> {
        let mut sessions = self.inner.write().await;
        let mut entry = sessions.remove(old)?;
        entry.last_seen = Instant::now();
        let token = generate_token();
        sessions.insert(token.clone(), entry);
        Some(token)
    }

    /// Forget the session under `token`. Returns whether it existed.
    pub async fn remove(&self, token: &str) -> bool {
        self.inner.write().await.remove(token).is_some()
    }

    /// Drop sessions not seen within the idle window. Returns how many were removed.
    pub async fn prune_idle(&self) -> usize {
        self.prune_older_than(Instant::now().checked_sub(self.idle)).await
    }

    async fn prune_older_than(&self, cutoff: Option<Instant>) -> usize {
        let Some(cutoff) = cutoff else {
            return 0;
        };
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen >= cutoff);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// Spawn the background task that evicts idle sessions every `every`.
pub fn spawn_session_sweeper(store: SessionStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = store.prune_idle().await;
            if removed > 0 {
                let remaining = store.len().await;
                info!(removed, remaining, "evicted idle sessions");
            }
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
