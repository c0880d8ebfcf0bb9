//! Service-account credentials for the store's REST API.
//!
//! Signs an RS256 JWT assertion for the configured account and exchanges it
//! for a short-lived bearer token, which is reused until shortly before it
//! expires.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::core::config::DatastoreConfig;
use crate::errors::DatastoreError;

/// Scopes requested for every token: store read/write and identity.
pub const DATASTORE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/datastore",
    "https://www.googleapis.com/auth/userinfo.email",
];

pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    #[must_use]
    pub fn new(service_account_name: &str, issued_at: DateTime<Utc>) -> Self {
        let iat = issued_at.timestamp();
        Self {
            iss: service_account_name.to_string(),
            scope: DATASTORE_SCOPES.join(" "),
            aud: TOKEN_URI.to_string(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

pub struct ServiceAccountAuth {
    service_account_name: String,
    key: EncodingKey,
    http: Client,
    token: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// # Errors
    ///
    /// Returns `AuthError` when the private key is not an RSA PEM.
    pub fn new(config: &DatastoreConfig, http: Client) -> Result<Self, DatastoreError> {
        let key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())
            .map_err(|e| DatastoreError::AuthError(format!("Invalid private key: {e}")))?;

        Ok(Self {
            service_account_name: config.service_account_name.clone(),
            key,
            http,
            token: Mutex::new(None),
        })
    }

    /// # Errors
    ///
    /// Returns `AuthError` if the assertion cannot be signed.
    pub fn sign_assertion(&self, issued_at: DateTime<Utc>) -> Result<String, DatastoreError> {
        let claims = AssertionClaims::new(&self.service_account_name, issued_at);
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &self.key)?)
    }

    /// A bearer token valid for at least another minute.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` when the token endpoint rejects the assertion and
    /// `HttpError` on transport failures.
    pub async fn access_token(&self) -> Result<String, DatastoreError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();

        if let Some(token) = &*cached
            && token.expires_at - ChronoDuration::seconds(REFRESH_MARGIN_SECS) > now
        {
            return Ok(token.value.clone());
        }

        debug!(account = %self.service_account_name, "Requesting access token");
        let assertion = self.sign_assertion(now)?;
        let response = self
            .http
            .post(TOKEN_URI)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(DatastoreError::AuthError(format!(
                "Token exchange failed (status {status}): {body}"
            )));
        }

        let token: TokenResponse = response.json().await?;
        info!(account = %self.service_account_name, expires_in = token.expires_in, "Obtained access token");

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: now + ChronoDuration::seconds(token.expires_in),
        });
        Ok(value)
    }
}
