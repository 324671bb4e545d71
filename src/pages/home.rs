//! Home page: greeting + logout when logged in, login button otherwise.

use leptos::prelude::*;

use super::Page;
use crate::services::session::SessionView;

pub const TITLE: &str = "Descope Demo";

pub fn home_page(session: &SessionView) -> Page {
    let body = if session.logged_in {
        let greeting = format!("You are logged in, {}!", session.display_name());
        view! {
            <main class="center">
                <div class="stack">
                    <h1 class="heading">{greeting}</h1>
                    <form method="post" action="/logout">
                        <button type="submit" class="button button--red">"Logout"</button>
                    </form>
                </div>
            </main>
        }
        .into_any()
    } else {
        view! {
            <main class="center">
                <a href="/login" class="button button--blue">"Login with Descope"</a>
            </main>
        }
        .into_any()
    };
    Page::new(TITLE, body)
}

#[cfg(test)]
#[path = "home_test.rs"]
mod tests;
