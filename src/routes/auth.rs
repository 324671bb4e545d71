//! Auth routes — hosted login redirect, provider callback, logout.

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::pages::{callback, render_document};
use crate::services::login::{self as login_svc, CallbackParams};
use crate::services::session::SessionHandle;
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

// =============================================================================
// SESSION COOKIE
// =============================================================================

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

/// Resolve the caller's session from its cookie, issuing a new session (and
/// cookie) when the browser has none or presents an unknown token. Returns
/// the jar, the session token, and the session.
pub(crate) async fn resolve_session(state: &AppState, jar: CookieJar) -> (CookieJar, String, SessionHandle) {
    let presented = jar.get(COOKIE_NAME).map(Cookie::value);
    let (token, session, created) = state.sessions.get_or_create(presented).await;
    if !created {
        return (jar, token, session);
    }
    let jar = jar.add(session_cookie(token.clone(), state.cookie_secure));
    (jar, token, session)
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /login` — start a login and redirect to the hosted login page.
pub async fn login(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let (jar, _, handle) = resolve_session(&state, jar).await;
    let url = login_svc::start_login(state.provider.as_ref(), &mut *handle.lock().await);
    (jar, Redirect::temporary(&url))
}

/// `GET /callback` — with provider parameters, finalize and redirect;
/// otherwise render the callback page for the current session.
///
/// A login that completes here moves the session to a new token, so the
/// token the browser held while logged out stops working.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let (mut jar, token, handle) = resolve_session(&state, jar).await;
    let mut session = handle.lock().await;

    if params.is_provider_redirect() {
        let was_logged_in = session.view.logged_in;
        let target = login_svc::auth_redirect(state.provider.as_ref(), &mut session, &params).await;
        let just_logged_in = !was_logged_in && session.view.logged_in;
        drop(session);

        if just_logged_in {
            if let Some(rotated) = state.sessions.rotate(&token).await {
                jar = jar.add(session_cookie(rotated, state.cookie_secure));
            }
        }
        return (jar, Redirect::to(target.path())).into_response();
    }

    let html = render_document(callback::callback_page(&session.view));
    (jar, Html(html)).into_response()
}

/// `POST /logout` — forget the user, revoke tokens, drop the session and its
/// cookie, back to `/`.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let (jar, token, handle) = resolve_session(&state, jar).await;
    login_svc::logout(state.provider.as_ref(), &mut *handle.lock().await).await;
    state.sessions.remove(&token).await;
    (jar.add(cleared_session_cookie(state.cookie_secure)), Redirect::to("/"))
}
