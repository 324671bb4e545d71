//! Runtime configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! `main` loads `.env` through `dotenvy` before anything here runs, so a
//! local `.env` file and real environment variables are interchangeable. A
//! missing `.env` is normal; a malformed one is logged as a warning.
//! Provider settings are required; server tuning knobs fall back to defaults.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DESCOPE_BASE_URL: &str = "https://api.descope.com";
pub const DEFAULT_DESCOPE_SCOPES: &str = "openid profile email";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 86_400;
pub const DEFAULT_SESSION_SWEEP_SECS: u64 = 300;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    Missing { var: &'static str },
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

// =============================================================================
// ENV HELPERS
// =============================================================================

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

/// Parse `key` as `T`, falling back to `default` when unset.
/// A set-but-unparseable value is an error rather than a silent default.
fn env_parse<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var: key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// The `.env` load failure worth reporting. A missing file is not one.
pub fn dotenv_failure(loaded: Result<PathBuf, dotenvy::Error>) -> Option<dotenvy::Error> {
    loaded.err().filter(|e| !e.not_found())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// DESCOPE CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Identity provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescopeConfig {
    /// Descope project id, used as the OAuth client id.
    pub project_id: String,
    /// Provider API origin without a trailing slash.
    pub base_url: String,
    /// Where the hosted login sends the browser back to.
    pub redirect_uri: String,
    pub scopes: String,
    pub timeouts: HttpTimeouts,
}

impl DescopeConfig {
    /// Build provider config from environment variables.
    ///
    /// Required:
    /// - `DESCOPE_PROJECT_ID`
    ///
    /// Optional:
    /// - `DESCOPE_BASE_URL`: default `https://api.descope.com`
    /// - `DESCOPE_REDIRECT_URI`: default `http://localhost:{port}/callback`
    /// - `DESCOPE_SCOPES`: default `openid profile email`
    /// - `DESCOPE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `DESCOPE_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the project id is missing or a timeout is not a number.
    pub fn from_env(port: u16) -> Result<Self, ConfigError> {
        let project_id = env_non_empty("DESCOPE_PROJECT_ID").ok_or(ConfigError::Missing { var: "DESCOPE_PROJECT_ID" })?;
        let base_url = env_non_empty("DESCOPE_BASE_URL")
            .unwrap_or_else(|| DEFAULT_DESCOPE_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let redirect_uri =
            env_non_empty("DESCOPE_REDIRECT_URI").unwrap_or_else(|| format!("http://localhost:{port}/callback"));
        let scopes = env_non_empty("DESCOPE_SCOPES").unwrap_or_else(|| DEFAULT_DESCOPE_SCOPES.to_owned());
        let timeouts = HttpTimeouts {
            request_secs: env_parse("DESCOPE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse("DESCOPE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { project_id, base_url, redirect_uri, scopes, timeouts })
    }
}

// =============================================================================
// SERVER CONFIG
// =============================================================================

/// Listener, cookie and session-lifetime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub cookie_secure: bool,
    pub session_idle: Duration,
    pub session_sweep: Duration,
}

impl ServerConfig {
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env_parse("PORT", DEFAULT_PORT)?;
        let session_idle = Duration::from_secs(env_parse("SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS)?);
        let session_sweep = Duration::from_secs(env_parse("SESSION_SWEEP_SECS", DEFAULT_SESSION_SWEEP_SECS)?);
        Ok(Self { port, cookie_secure: false, session_idle, session_sweep })
    }

    /// Resolve the cookie `Secure` flag: explicit `COOKIE_SECURE` wins,
    /// otherwise secure whenever the callback is served over https.
    #[must_use]
    pub fn with_cookie_secure_for(mut self, redirect_uri: &str) -> Self {
        self.cookie_secure = env_bool("COOKIE_SECURE").unwrap_or_else(|| redirect_uri.starts_with("https://"));
        self
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
