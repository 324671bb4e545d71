use super::*;
use crate::services::provider::test_helpers::{AUTHORIZE_BASE, ScriptedProvider, state_from_url};

/// Start a login and build the callback params the provider would send back.
fn begin(provider: &ScriptedProvider, session: &mut AuthSession, code: &str) -> CallbackParams {
    let url = start_login(provider, session);
    CallbackParams { code: Some(code.into()), state: Some(state_from_url(&url)), ..CallbackParams::default() }
}

// =============================================================================
// CallbackParams / RedirectTarget
// =============================================================================

#[test]
fn plain_visit_is_not_provider_redirect() {
    assert!(!CallbackParams::default().is_provider_redirect());
}

#[test]
fn code_or_error_marks_provider_redirect() {
    let with_code = CallbackParams { code: Some("c".into()), ..CallbackParams::default() };
    let with_error = CallbackParams { error: Some("access_denied".into()), ..CallbackParams::default() };
    assert!(with_code.is_provider_redirect());
    assert!(with_error.is_provider_redirect());
}

#[test]
fn redirect_target_paths() {
    assert_eq!(RedirectTarget::Home.path(), "/");
    assert_eq!(RedirectTarget::Callback.path(), "/callback");
}

// =============================================================================
// start_login
// =============================================================================

#[test]
fn start_login_records_pending_and_returns_provider_url() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let url = start_login(&provider, &mut session);

    assert!(url.starts_with(AUTHORIZE_BASE));
    let pending = session.pending.as_ref().unwrap();
    assert_eq!(state_from_url(&url), pending.state);
    assert_eq!(pending.code_verifier.len(), 43);
}

#[test]
fn start_login_clears_previous_error() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    session.view.error_message = Some("invalid_token".into());
    start_login(&provider, &mut session);
    assert!(!session.view.has_error());
}

#[test]
fn start_login_twice_replaces_pending_state() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let first = start_login(&provider, &mut session);
    let second = start_login(&provider, &mut session);
    assert_ne!(state_from_url(&first), state_from_url(&second));
    assert_eq!(session.pending.as_ref().unwrap().state, state_from_url(&second));
}

// =============================================================================
// auth_redirect
// =============================================================================

#[tokio::test]
async fn successful_finalize_redirects_home() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let params = begin(&provider, &mut session, "good");

    let target = auth_redirect(&provider, &mut session, &params).await;
    assert_eq!(target, RedirectTarget::Home);
    assert!(session.view.logged_in);
    assert_eq!(session.view.display_name(), "Alice");
    assert!(session.tokens.is_some());
    assert!(session.pending.is_none());
}

#[tokio::test]
async fn failed_finalize_redirects_to_callback() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let params = begin(&provider, &mut session, "bad");

    let target = auth_redirect(&provider, &mut session, &params).await;
    assert_eq!(target, RedirectTarget::Callback);
    assert!(!session.view.logged_in);
    assert_eq!(session.view.error_text(), "invalid_token");
    assert!(session.tokens.is_none());
}

#[tokio::test]
async fn transport_failure_becomes_error_message() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let params = begin(&provider, &mut session, "down");

    let target = auth_redirect(&provider, &mut session, &params).await;
    assert_eq!(target, RedirectTarget::Callback);
    assert_eq!(session.view.error_text(), "provider_unavailable");
}

#[tokio::test]
async fn login_without_name_claim_greets_user() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let params = begin(&provider, &mut session, "noname");

    assert_eq!(auth_redirect(&provider, &mut session, &params).await, RedirectTarget::Home);
    assert_eq!(session.view.display_name(), "User");
}

#[tokio::test]
async fn provider_error_param_skips_finalize() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let url = start_login(&provider, &mut session);
    let params = CallbackParams {
        state: Some(state_from_url(&url)),
        error: Some("access_denied".into()),
        error_description: Some("user cancelled".into()),
        ..CallbackParams::default()
    };

    assert_eq!(auth_redirect(&provider, &mut session, &params).await, RedirectTarget::Callback);
    assert_eq!(session.view.error_text(), "access_denied");
    assert_eq!(provider.finalize_count(), 0);
}

#[tokio::test]
async fn error_param_with_forged_state_is_state_mismatch() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    start_login(&provider, &mut session);
    let params = CallbackParams {
        state: Some("forged".into()),
        error: Some("Your account is locked, call 555-0100".into()),
        ..CallbackParams::default()
    };

    assert_eq!(auth_redirect(&provider, &mut session, &params).await, RedirectTarget::Callback);
    assert_eq!(session.view.error_text(), STATE_MISMATCH);
    assert!(session.pending.is_none());
}

#[tokio::test]
async fn error_param_without_state_is_state_mismatch() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    start_login(&provider, &mut session);
    let params = CallbackParams { error: Some("access_denied".into()), ..CallbackParams::default() };

    auth_redirect(&provider, &mut session, &params).await;
    assert_eq!(session.view.error_text(), STATE_MISMATCH);
}

#[tokio::test]
async fn foreign_state_never_reaches_provider() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let mut params = begin(&provider, &mut session, "good");
    params.state = Some("someone-elses-state".into());

    assert_eq!(auth_redirect(&provider, &mut session, &params).await, RedirectTarget::Callback);
    assert_eq!(session.view.error_text(), STATE_MISMATCH);
    assert_eq!(provider.finalize_count(), 0);
}

#[tokio::test]
async fn missing_state_is_mismatch() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let mut params = begin(&provider, &mut session, "good");
    params.state = None;

    auth_redirect(&provider, &mut session, &params).await;
    assert_eq!(session.view.error_text(), STATE_MISMATCH);
}

#[tokio::test]
async fn empty_code_is_missing_code() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let params = begin(&provider, &mut session, "");

    assert_eq!(auth_redirect(&provider, &mut session, &params).await, RedirectTarget::Callback);
    assert_eq!(session.view.error_text(), MISSING_CODE);
}

#[tokio::test]
async fn callback_without_login_in_progress_is_error() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let params = CallbackParams { code: Some("good".into()), state: Some("x".into()), ..CallbackParams::default() };

    assert_eq!(auth_redirect(&provider, &mut session, &params).await, RedirectTarget::Callback);
    assert_eq!(session.view.error_text(), NO_LOGIN_IN_PROGRESS);
    assert_eq!(provider.finalize_count(), 0);
}

#[tokio::test]
async fn duplicate_callback_after_success_is_noop() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let params = begin(&provider, &mut session, "good");

    assert_eq!(auth_redirect(&provider, &mut session, &params).await, RedirectTarget::Home);
    assert_eq!(auth_redirect(&provider, &mut session, &params).await, RedirectTarget::Home);
    assert_eq!(provider.finalize_count(), 1);
    assert!(session.view.logged_in);
}

#[tokio::test]
async fn pending_login_is_single_use_after_failure() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let params = begin(&provider, &mut session, "bad");

    auth_redirect(&provider, &mut session, &params).await;
    auth_redirect(&provider, &mut session, &params).await;
    assert_eq!(provider.finalize_count(), 1);
    assert_eq!(session.view.error_text(), NO_LOGIN_IN_PROGRESS);
}

#[tokio::test]
async fn retry_after_failure_succeeds_and_clears_error() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let failed = begin(&provider, &mut session, "bad");
    auth_redirect(&provider, &mut session, &failed).await;

    let retry = begin(&provider, &mut session, "good");
    assert!(!session.view.has_error());
    assert_eq!(auth_redirect(&provider, &mut session, &retry).await, RedirectTarget::Home);
    assert!(session.view.error_message.is_none());
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_resets_view_and_revokes_tokens() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    let params = begin(&provider, &mut session, "good");
    auth_redirect(&provider, &mut session, &params).await;

    logout(&provider, &mut session).await;
    assert!(!session.view.logged_in);
    assert!(session.view.userinfo.is_empty());
    assert!(session.tokens.is_none());
    assert_eq!(provider.logout_count(), 1);
}

#[tokio::test]
async fn logout_when_logged_out_skips_provider() {
    let provider = ScriptedProvider::default();
    let mut session = AuthSession::default();
    logout(&provider, &mut session).await;
    assert_eq!(provider.logout_count(), 0);
}

#[tokio::test]
async fn logout_revocation_failure_still_logs_out_locally() {
    let provider = ScriptedProvider { fail_logout: true, ..ScriptedProvider::default() };
    let mut session = AuthSession::default();
    let params = begin(&provider, &mut session, "good");
    auth_redirect(&provider, &mut session, &params).await;

    logout(&provider, &mut session).await;
    assert!(!session.view.logged_in);
    assert_eq!(provider.logout_count(), 1);
}
