//! Server-rendered pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each page is a Leptos view built from a snapshot of the session and
//! rendered to a complete HTML document per request. There is no client
//! bundle: buttons are plain links and forms pointing at the auth routes.

pub mod callback;
pub mod home;

use leptos::prelude::*;

const STYLES: &str = r"
body { margin: 0; font-family: system-ui, sans-serif; background: #fcfcfd; color: #1c2024; }
.center { display: flex; align-items: center; justify-content: center; min-height: 100vh; }
.stack { display: flex; flex-direction: column; align-items: center; justify-content: center; gap: 24px; }
.heading { margin: 0; font-size: 28px; font-weight: 700; }
.heading--red { color: #ce2c31; }
.text { margin: 0; font-size: 16px; }
.button { display: inline-flex; align-items: center; height: 48px; padding: 0 24px; border: 0; border-radius: 12px;
          font-size: 18px; font-weight: 500; color: #fff; text-decoration: none; cursor: pointer; }
.button--blue { background: #0090ff; }
.button--red { background: #e5484d; }
.spinner { width: 32px; height: 32px; border: 3px solid #e0e1e6; border-top-color: #0090ff; border-radius: 50%;
           animation: spin 0.8s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }
";

/// A page ready to be wrapped in the document shell.
pub struct Page {
    pub title: &'static str,
    /// `content` of a `<meta http-equiv="refresh">` placed in the head.
    pub refresh: Option<String>,
    pub body: AnyView,
}

impl Page {
    pub fn new(title: &'static str, body: AnyView) -> Self {
        Self { title, refresh: None, body }
    }

    /// Reload to `url` after `secs` seconds.
    #[must_use]
    pub fn refresh_to(mut self, secs: u32, url: &str) -> Self {
        self.refresh = Some(format!("{secs};url={url}"));
        self
    }
}

/// Wrap a page in the HTML shell and render it to a string.
pub fn render_document(page: Page) -> String {
    let Page { title, refresh, body } = page;
    let owner = leptos::reactive::owner::Owner::new();
    let html = owner.with(move || {
        let refresh = refresh.map(|content| view! { <meta http-equiv="refresh" content=content /> });
        view! {
            <html lang="en">
                <head>
                    <meta charset="utf-8" />
                    <meta name="viewport" content="width=device-width, initial-scale=1" />
                    {refresh}
                    <title>{title}</title>
                    <style>{STYLES}</style>
                </head>
                <body>{body}</body>
            </html>
        }
        .to_html()
    });
    format!("<!DOCTYPE html>{html}")
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
