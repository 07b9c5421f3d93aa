//! Google OAuth 2.0 sign-in (authorization code flow with PKCE).
//!
//! # Flow
//!
//! 1. `/auth/google/login` stores a random `state` and PKCE verifier in the
//!    session and redirects to [`GoogleAuthClient::authorization_url`].
//! 2. Google redirects back to `/auth/google/callback` with a code.
//! 3. [`GoogleAuthClient::exchange_code`] trades the code for an access token.
//! 4. [`GoogleAuthClient::userinfo`] returns the stable subject and email.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::instrument;

use crate::config::GoogleConfig;
use crate::models::GoogleIdentity;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Errors from the Google OAuth endpoints.
#[derive(Debug, Error)]
pub enum GoogleAuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token exchange was rejected.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// Userinfo request was rejected or incomplete.
    #[error("userinfo request failed: {0}")]
    UserInfo(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

/// Generate a random alphanumeric string for `state` and PKCE verifiers.
#[must_use]
pub fn generate_random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// PKCE `S256` challenge for a verifier.
#[must_use]
pub fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Client for Google's OAuth and userinfo endpoints.
#[derive(Clone)]
pub struct GoogleAuthClient {
    inner: Arc<GoogleAuthClientInner>,
}

struct GoogleAuthClientInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
}

impl GoogleAuthClient {
    #[must_use]
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            inner: Arc::new(GoogleAuthClientInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            }),
        }
    }

    /// Build the URL to send the browser to.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str, code_challenge: &str) -> String {
        format!(
            "{AUTHORIZE_URL}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email%20profile&\
            state={}&\
            code_challenge={}&\
            code_challenge_method=S256&\
            prompt=select_account",
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
            urlencoding::encode(code_challenge)
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if Google rejects the code or the request fails.
    #[instrument(skip_all)]
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<String, GoogleAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("code_verifier", code_verifier),
        ];

        let response = self
            .inner
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleAuthError::TokenExchange(
                text.chars().take(200).collect(),
            ));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Fetch the signed-in account's identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the account has no email.
    #[instrument(skip_all)]
    pub async fn userinfo(&self, access_token: &str) -> Result<GoogleIdentity, GoogleAuthError> {
        let response = self
            .inner
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleAuthError::UserInfo(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let info: UserInfoResponse = response.json().await?;
        let email = info
            .email
            .ok_or_else(|| GoogleAuthError::UserInfo("account has no email".to_string()))?;

        Ok(GoogleIdentity {
            subject: info.sub,
            email,
            name: info.name,
            picture: info.picture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleAuthClient {
        GoogleAuthClient::new(&GoogleConfig {
            client_id: "client id".to_string(),
            client_secret: SecretString::from("unused"),
            books_api_key: SecretString::from("unused"),
        })
    }

    #[test]
    fn test_pkce_challenge_rfc7636_vector() {
        assert_eq!(
            pkce_challenge("dBjftJeZ4CVP-1J0ZbvHaNNMYTkpokTEb5YPNJmLtXI"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_random_strings_differ() {
        let a = generate_random_string(32);
        let b = generate_random_string(32);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_authorization_url_encodes_params() {
        let url = client().authorization_url(
            "http://localhost:3000/auth/google/callback",
            "st4te",
            "ch4llenge",
        );
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client%20id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fgoogle%2Fcallback"));
        assert!(url.contains("state=st4te"));
        assert!(url.contains("code_challenge=ch4llenge&code_challenge_method=S256"));
    }
}
