//! Callback page: retry screen after a failed login, spinner otherwise.

use leptos::prelude::*;

use super::Page;
use crate::services::session::SessionView;

pub const TITLE: &str = "Descope Demo - Login";

/// Seconds before the loading view falls back to `/`.
const LOADING_REFRESH_SECS: u32 = 3;

pub fn callback_page(session: &SessionView) -> Page {
    if session.has_error() {
        let message = session.error_text().to_owned();
        let body = view! {
            <main class="center">
                <div class="stack">
                    <h1 class="heading heading--red">"Login Failed"</h1>
                    <p class="text">{message}</p>
                    <a href="/login" class="button button--blue">"Try Again"</a>
                </div>
            </main>
        };
        Page::new(TITLE, body.into_any())
    } else {
        let body = view! {
            <main class="center">
                <div class="stack">
                    <div class="spinner"></div>
                    <h1 class="heading">"Processing login..."</h1>
                </div>
            </main>
        };
        Page::new(TITLE, body.into_any()).refresh_to(LOADING_REFRESH_SECS, "/")
    }
}

#[cfg(test)]
#[path = "callback_test.rs"]
mod tests;
