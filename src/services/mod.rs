//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the login flow, session bookkeeping and provider
//! calls so route handlers can stay focused on cookies, redirects and HTML.

pub mod descope;
pub mod login;
pub mod provider;
pub mod session;
