//! Login flow — start, finalize, callback redirect, logout.
//!
//! SYSTEM CONTEXT
//! ==============
//! `/login` calls `start_login`, the provider's hosted login sends the browser
//! to `/callback?code=..&state=..`, and the callback route runs
//! `auth_redirect` before the callback page is shown. Every function here
//! works on a locked `AuthSession`; none of them touch the session store.
//!
//! ERROR HANDLING
//! ==============
//! Finalize never fails outward. Provider rejections and transport failures
//! alike land in `error_message`, which the callback page turns into a retry
//! screen.

use serde::Deserialize;
use tracing::{error, info, warn};

use super::provider::AuthProvider;
use super::session::{AuthSession, PendingLogin, SessionView, generate_pkce, generate_token};

pub const NO_LOGIN_IN_PROGRESS: &str = "no_login_in_progress";
pub const STATE_MISMATCH: &str = "state_mismatch";
pub const MISSING_CODE: &str = "missing_code";

/// Query parameters the provider appends to the callback URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Whether this request is the provider's redirect rather than a plain page view.
    #[must_use]
    pub fn is_provider_redirect(&self) -> bool {
        self.code.is_some() || self.error.is_some()
    }
}

/// Where the callback handler sends the browser next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Home,
    Callback,
}

impl RedirectTarget {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Callback => "/callback",
        }
    }
}

/// Begin a hosted login: remember a fresh CSRF state and PKCE verifier on the
/// session and return the provider URL to send the browser to.
pub fn start_login(provider: &dyn AuthProvider, session: &mut AuthSession) -> String {
    let state = generate_token();
    let (code_verifier, code_challenge) = generate_pkce();
    let url = provider.authorize_url(&state, &code_challenge);

    session.view.error_message = None;
    session.pending = Some(PendingLogin { state, code_verifier });
    info!("login started");
    url
}

/// Complete a login from the provider's callback parameters. Populates
/// `logged_in`/`userinfo` on success and `error_message` on failure.
pub async fn finalize_auth(provider: &dyn AuthProvider, session: &mut AuthSession, params: &CallbackParams) {
    let Some(pending) = session.pending.take() else {
        if session.view.logged_in {
            // Replayed callback (back button, refresh) after a completed login.
            return;
        }
        warn!("callback without a login in progress");
        session.view.error_message = Some(NO_LOGIN_IN_PROGRESS.to_owned());
        return;
    };

    // Error responses carry `state` too; check it before trusting `error`.
    if params.state.as_deref() != Some(pending.state.as_str()) {
        warn!("callback state does not match pending login");
        session.view.error_message = Some(STATE_MISMATCH.to_owned());
        return;
    }

    if let Some(err) = params.error.as_deref() {
        warn!(error = err, description = ?params.error_description, "provider returned login error");
        session.view.error_message = Some(err.to_owned());
        return;
    }

    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        session.view.error_message = Some(MISSING_CODE.to_owned());
        return;
    };

    match provider.finalize(code, &pending.code_verifier).await {
        Ok(identity) => {
            session.view = SessionView { logged_in: true, userinfo: identity.userinfo, error_message: None };
            info!(expires_in = ?identity.tokens.expires_in, "login finalized");
            session.tokens = Some(identity.tokens);
        }
        Err(e) => {
            error!(error = %e, "login finalize failed");
            session.view.error_message = Some(e.error_message());
        }
    }
}

/// Callback load handler: finalize, then route to the retry screen on error
/// or home otherwise.
pub async fn auth_redirect(
    provider: &dyn AuthProvider,
    session: &mut AuthSession,
    params: &CallbackParams,
) -> RedirectTarget {
    finalize_auth(provider, session, params).await;
    if session.view.has_error() { RedirectTarget::Callback } else { RedirectTarget::Home }
}

/// Forget the user locally and revoke their tokens at the provider.
/// Revocation failure is logged only; the local logout always happens.
pub async fn logout(provider: &dyn AuthProvider, session: &mut AuthSession) {
    session.view = SessionView::default();
    session.pending = None;
    let Some(tokens) = session.tokens.take() else {
        return;
    };
    match provider.logout(&tokens).await {
        Ok(()) => info!("logged out"),
        Err(e) => warn!(error = %e, "token revocation failed"),
    }
}

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;
