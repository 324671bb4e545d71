//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the identity provider and the in-memory session store. Per-browser
//! state lives in the store, never in module-level globals.

use std::sync::Arc;

use crate::services::provider::AuthProvider;
use crate::services::session::SessionStore;

/// Clone is required by Axum — all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn AuthProvider>,
    pub sessions: SessionStore,
    /// Whether session cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
}

impl AppState {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>, sessions: SessionStore, cookie_secure: bool) -> Self {
        Self { provider, sessions, cookie_secure }
    }
}
