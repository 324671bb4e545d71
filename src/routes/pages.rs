//! Page routes.

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum_extra::extract::cookie::CookieJar;

use super::auth::resolve_session;
use crate::pages::{home, render_document};
use crate::state::AppState;

/// `GET /` — home page for the current session.
pub async fn index(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let (jar, _, handle) = resolve_session(&state, jar).await;
    let view = handle.lock().await.view.clone();
    (jar, Html(render_document(home::home_page(&view))))
}
