//! Descope OIDC client — hosted-login URL, code redemption, token revocation.
//!
//! All endpoints live under `{base_url}/oauth2/v1/`. The project id doubles
//! as the OAuth client id; PKCE stands in for a client secret.

use std::time::Duration;

use url::Url;

use super::provider::{AuthProvider, Identity, OAuthErrorBody, ProviderError, TokenSet, UserInfo};
use crate::config::DescopeConfig;

pub struct DescopeClient {
    config: DescopeConfig,
    http: reqwest::Client,
}

impl DescopeClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: DescopeConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ProviderError::HttpClientBuild(e.to_string()))?;
        Ok(Self { config, http })
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.config.project_id
    }

    pub(crate) fn endpoint(&self, name: &str) -> String {
        format!("{}/oauth2/v1/{name}", self.config.base_url)
    }

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenSet, ProviderError> {
        let resp = self
            .http
            .post(self.endpoint("token"))
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.config.project_id.as_str()),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("code_verifier", code_verifier),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        parse_token_response(status, &body)
    }

    async fn fetch_userinfo(&self, tokens: &TokenSet) -> Result<UserInfo, ProviderError> {
        let resp = self
            .http
            .get(self.endpoint("userinfo"))
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        parse_userinfo_response(status, &body)
    }
}

#[async_trait::async_trait]
impl AuthProvider for DescopeClient {
    fn authorize_url(&self, state: &str, code_challenge: &str) -> String {
        build_authorize_url(&self.config, &self.endpoint("authorize"), state, code_challenge)
    }

    async fn finalize(&self, code: &str, code_verifier: &str) -> Result<Identity, ProviderError> {
        let tokens = self.exchange_code(code, code_verifier).await?;
        let userinfo = self.fetch_userinfo(&tokens).await?;
        Ok(Identity { tokens, userinfo })
    }

    async fn logout(&self, tokens: &TokenSet) -> Result<(), ProviderError> {
        let (token, hint) = match tokens.refresh_token.as_deref() {
            Some(refresh) => (refresh, "refresh_token"),
            None => (tokens.access_token.as_str(), "access_token"),
        };
        let resp = self
            .http
            .post(self.endpoint("revoke"))
            .form(&[
                ("client_id", self.config.project_id.as_str()),
                ("token", token),
                ("token_type_hint", hint),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(oauth_error(status, &body))
    }
}

// =============================================================================
// URL / RESPONSE HELPERS
// =============================================================================

/// Build the hosted-login URL with PKCE (S256) and CSRF state, URL-encoded.
pub(crate) fn build_authorize_url(
    config: &DescopeConfig,
    authorize_endpoint: &str,
    state: &str,
    code_challenge: &str,
) -> String {
    let Ok(mut url) = Url::parse(authorize_endpoint) else {
        // base_url is operator config; fall back to the raw string so the
        // browser surfaces the bad URL instead of the server panicking.
        return authorize_endpoint.to_owned();
    };
    url.query_pairs_mut()
        .append_pair("client_id", &config.project_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &config.scopes)
        .append_pair("state", state)
        .append_pair("code_challenge", code_challenge)
        .append_pair("code_challenge_method", "S256");
    url.to_string()
}

fn oauth_error(status: reqwest::StatusCode, body: &str) -> ProviderError {
    match serde_json::from_str::<OAuthErrorBody>(body) {
        Ok(err) => ProviderError::Rejected { error: err.error, description: err.error_description },
        Err(_) => ProviderError::InvalidResponse(format!("{status}: {body}")),
    }
}

pub(crate) fn parse_token_response(status: reqwest::StatusCode, body: &str) -> Result<TokenSet, ProviderError> {
    if !status.is_success() {
        return Err(oauth_error(status, body));
    }
    serde_json::from_str(body).map_err(|_| ProviderError::InvalidResponse(format!("unexpected token response: {body}")))
}

pub(crate) fn parse_userinfo_response(status: reqwest::StatusCode, body: &str) -> Result<UserInfo, ProviderError> {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ProviderError::Rejected { error: "invalid_token".to_owned(), description: None });
    }
    if !status.is_success() {
        return Err(oauth_error(status, body));
    }
    serde_json::from_str(body).map_err(|e| ProviderError::InvalidResponse(format!("userinfo: {e}")))
}

#[cfg(test)]
#[path = "descope_test.rs"]
mod tests;
