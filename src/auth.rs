//! Token refresh against the Nimbus Cloud auth service.
//!
//! The [`AuthClient`] exchanges a refresh token for a fresh access/refresh
//! pair. It deliberately uses its own bare HTTP client with no
//! reauthentication handler attached, so a refresh can never trigger
//! another refresh. Permanent API keys bypass this module entirely.

use std::sync::Arc;

use base64::{engine::general_purpose, Engine};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::{Credentials, ReauthHandler};
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("authentication failed: {0}")]
    AuthFailed(String),
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Access/refresh pair returned by the auth service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    token: &'a str,
}

pub struct AuthClient {
    auth_url: String,
    http: reqwest::Client,
}

impl AuthClient {
    pub fn new(auth_url: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Exchange a refresh token for a new access/refresh pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let url = format!("{}/auth/jwt/refresh", self.auth_url.trim_end_matches('/'));
        debug!("refreshing access token at {}", url);

        let response = self
            .http
            .post(&url)
            .json(&RefreshRequest {
                token: refresh_token,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let pair = response.json::<TokenPair>().await?;
            match token_expiry(&pair.access) {
                Ok(Some(exp)) => debug!("received access token, expires at unix {}", exp),
                Ok(None) => debug!("received access token without an exp claim"),
                Err(e) => warn!("received access token with undecodable payload: {}", e),
            }
            Ok(pair)
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!("token refresh failed with status {}: {}", status, body);
            Err(AuthError::AuthFailed(format!("HTTP {} {}", status, body)))
        }
    }

    /// Wrap this client as the provider client's reauthentication handler.
    /// The handler refuses to run for API-key credentials: permanent tokens
    /// are never refreshed.
    pub fn into_reauth_handler(self) -> ReauthHandler {
        let client = Arc::new(self);
        Arc::new(move |credentials: Credentials| {
            let client = Arc::clone(&client);
            async move {
                let refresh_token = match credentials.refresh_token() {
                    Some(token) => token.to_string(),
                    None => {
                        return Err(ApiError::ReauthFailed {
                            message: "credentials are a permanent API key".to_string(),
                        })
                    }
                };
                let pair = client
                    .refresh(&refresh_token)
                    .await
                    .map_err(|e| ApiError::ReauthFailed {
                        message: e.to_string(),
                    })?;
                Ok(Credentials::Token {
                    access_token: pair.access,
                    refresh_token: pair.refresh,
                })
            }
            .boxed()
        })
    }
}

#[derive(Debug, Deserialize)]
struct JwtClaims {
    exp: Option<i64>,
}

/// Decode the payload segment of a JWT and return its `exp` claim. Used for
/// logging only; tokens are never validated client-side.
pub fn token_expiry(token: &str) -> Result<Option<i64>, AuthError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| AuthError::InvalidToken("token is not a JWT".to_string()))?;
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    let claims: JwtClaims = serde_json::from_slice(&bytes)?;
    Ok(claims.exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_jwt(payload: serde_json::Value) -> String {
        let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn test_token_expiry_reads_exp_claim() {
        let token = make_jwt(serde_json::json!({"sub": "user-1", "exp": 1735689600}));
        assert_eq!(token_expiry(&token).unwrap(), Some(1735689600));
    }

    #[test]
    fn test_token_expiry_without_exp_claim() {
        let token = make_jwt(serde_json::json!({"sub": "user-1"}));
        assert_eq!(token_expiry(&token).unwrap(), None);
    }

    #[test]
    fn test_token_expiry_rejects_non_jwt() {
        assert!(matches!(
            token_expiry("not-a-jwt"),
            Err(AuthError::InvalidToken(_))
        ));
        assert!(matches!(
            token_expiry("a.%%%.c"),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
