//! Identity provider seam.
//!
//! DESIGN
//! ======
//! Route handlers and the login flow only see `dyn AuthProvider`. The
//! production implementation is `descope::DescopeClient`; tests plug in
//! scripted providers. Token exchange and credential validation happen on the
//! provider's side of this trait.

use std::collections::HashMap;

use serde::Deserialize;

/// Claims returned by the provider's userinfo endpoint (`name`, `email`, `sub`, ...).
pub type UserInfo = HashMap<String, serde_json::Value>;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by identity provider calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request never produced a response (DNS, TLS, timeout, ...).
    #[error("provider request failed: {0}")]
    Request(String),

    /// The provider answered with an OAuth error body.
    #[error("provider rejected request: {error} ({description:?})")]
    Rejected { error: String, description: Option<String> },

    /// The provider answered with something we could not parse.
    #[error("provider response invalid: {0}")]
    InvalidResponse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ProviderError {
    /// Short code shown to the user on the retry screen.
    #[must_use]
    pub fn error_message(&self) -> String {
        match self {
            Self::Rejected { error, .. } => error.clone(),
            Self::Request(_) | Self::HttpClientBuild(_) => "provider_unavailable".to_owned(),
            Self::InvalidResponse(_) => "invalid_provider_response".to_owned(),
        }
    }
}

/// OAuth error body (RFC 6749 §5.2).
#[derive(Debug, Deserialize)]
pub(crate) struct OAuthErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

// =============================================================================
// TOKENS / IDENTITY
// =============================================================================

/// Token endpoint response. Held per session until logout.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Result of a completed login.
#[derive(Debug, Clone)]
pub struct Identity {
    pub tokens: TokenSet,
    pub userinfo: UserInfo,
}

// =============================================================================
// TRAIT
// =============================================================================

#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Hosted-login URL for one login attempt.
    fn authorize_url(&self, state: &str, code_challenge: &str) -> String;

    /// Complete a login: redeem the authorization code and load the user's claims.
    async fn finalize(&self, code: &str, code_verifier: &str) -> Result<Identity, ProviderError>;

    /// Invalidate the session's tokens at the provider.
    async fn logout(&self, tokens: &TokenSet) -> Result<(), ProviderError>;
}
