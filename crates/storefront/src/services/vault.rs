//! Vault client for dynamic database credentials.
//!
//! Every database connection asks Vault for a fresh username/password pair
//! (`GET /v1/{path}`), so the storefront never holds a long-lived database
//! password. Nothing is cached: Vault may rotate or lease a different pair on
//! every call and callers must not assume the pair is stable.
//!
//! # Response format
//!
//! A logical read returns the credential under `data`:
//!
//! ```json
//! { "lease_duration": 3600, "data": { "username": "v-app-x1", "password": "..." } }
//! ```
//!
//! KV v2 mounts nest it one level deeper (`data.data`); both shapes are
//! accepted.
//!
//! # Security
//!
//! - The token is only ever placed in the `X-Vault-Token` header
//! - Neither the token nor credential values appear in errors or logs
//! - [`DbCredential`] redacts both fields in its `Debug` output

use std::fmt;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::VaultConfig;

/// Header carrying the Vault token.
const TOKEN_HEADER: &str = "X-Vault-Token";

/// Header selecting a Vault Enterprise namespace.
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// Errors that can occur when fetching credentials from Vault.
///
/// All variants are reported to callers as "secret unavailable".
#[derive(Debug, Error)]
pub enum SecretsError {
    /// The secret path is malformed.
    #[error("invalid secret path: {0}")]
    InvalidPath(String),

    /// The path does not resolve to a secret.
    #[error("secret not found at {0}")]
    NotFound(String),

    /// Vault rejected the token for this path.
    #[error("vault denied access to {0}")]
    Unauthorized(String),

    /// Vault could not be reached or timed out.
    #[error("vault unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// Vault answered with an unexpected status.
    #[error("vault returned {status} for {path}")]
    Upstream { status: u16, path: String },

    /// The response did not contain a usable credential.
    #[error("malformed vault response: {0}")]
    Malformed(&'static str),
}

/// Logical identifier of a credential set, typically `{base}/{role}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretPath(String);

impl SecretPath {
    /// Parse a secret path.
    ///
    /// Leading and trailing slashes are ignored. The remaining path must be
    /// non-empty with no empty or `..` segments.
    ///
    /// # Errors
    ///
    /// Returns `SecretsError::InvalidPath` if the path is empty or malformed.
    pub fn new(path: &str) -> Result<Self, SecretsError> {
        let trimmed = path.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(SecretsError::InvalidPath("path is empty".to_string()));
        }
        for segment in trimmed.split('/') {
            if segment.is_empty() || segment == ".." || segment.chars().any(char::is_whitespace) {
                return Err(SecretsError::InvalidPath(format!(
                    "bad segment {segment:?} in {trimmed:?}"
                )));
            }
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Build a path from a base path and a role name.
    ///
    /// # Errors
    ///
    /// Returns `SecretsError::InvalidPath` if either part is empty or malformed.
    pub fn from_parts(base: &str, role: &str) -> Result<Self, SecretsError> {
        let base = base.trim().trim_matches('/');
        let role = role.trim().trim_matches('/');
        if base.is_empty() || role.is_empty() {
            return Err(SecretsError::InvalidPath(
                "base path and role are both required".to_string(),
            ));
        }
        Self::new(&format!("{base}/{role}"))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A database username/password pair.
///
/// Ephemeral: fetched per connection, never stored, never logged.
#[derive(Clone)]
pub struct DbCredential {
    username: String,
    password: SecretString,
}

impl DbCredential {
    /// Create a credential.
    #[must_use]
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Database role name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Database password.
    #[must_use]
    pub const fn password(&self) -> &SecretString {
        &self.password
    }
}

impl fmt::Debug for DbCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredential")
            .field("username", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Source of database credentials.
///
/// [`VaultClient`] is the production implementation; tests and alternative
/// backends implement this trait directly.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Fetch the current credential stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns `SecretsError` if the path does not resolve or the backend is
    /// unreachable or refuses access.
    async fn fetch_credentials(&self, path: &SecretPath) -> Result<DbCredential, SecretsError>;
}

/// Body of a Vault logical read.
#[derive(Deserialize)]
struct LogicalResponse {
    #[serde(default)]
    lease_duration: Option<u64>,
    #[serde(default)]
    renewable: Option<bool>,
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

/// HTTP client for the Vault API.
#[derive(Clone)]
pub struct VaultClient {
    client: reqwest::Client,
    address: Url,
}

impl fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultClient")
            .field("address", &self.address.as_str())
            .finish_non_exhaustive()
    }
}

impl VaultClient {
    /// Create a new Vault client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &VaultConfig) -> Result<Self, SecretsError> {
        let mut headers = HeaderMap::new();

        let mut token = HeaderValue::from_str(config.token.expose_secret())
            .map_err(|_| SecretsError::Malformed("vault token is not a valid header value"))?;
        token.set_sensitive(true);
        headers.insert(TOKEN_HEADER, token);

        if let Some(namespace) = &config.namespace {
            headers.insert(
                NAMESPACE_HEADER,
                HeaderValue::from_str(namespace)
                    .map_err(|_| SecretsError::Malformed("vault namespace is not a valid header value"))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(SecretsError::Unreachable)?;

        Ok(Self {
            client,
            address: with_trailing_slash(&config.address),
        })
    }

    fn secret_url(&self, path: &SecretPath) -> Result<Url, SecretsError> {
        self.address
            .join(&format!("v1/{}", path.as_str()))
            .map_err(|e| SecretsError::InvalidPath(e.to_string()))
    }
}

#[async_trait]
impl CredentialSource for VaultClient {
    #[instrument(skip(self), fields(path = %path))]
    async fn fetch_credentials(&self, path: &SecretPath) -> Result<DbCredential, SecretsError> {
        let url = self.secret_url(path)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SecretsError::Unreachable(e.without_url()))?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(SecretsError::NotFound(path.to_string()));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SecretsError::Unauthorized(path.to_string()));
        }
        if !status.is_success() {
            return Err(SecretsError::Upstream {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body: LogicalResponse = response
            .json()
            .await
            .map_err(|_| SecretsError::Malformed("response body is not a vault secret"))?;

        let credential = credential_from_data(body.data)?;

        tracing::debug!(
            lease_duration = ?body.lease_duration,
            renewable = ?body.renewable,
            "Fetched database credentials"
        );

        Ok(credential)
    }
}

/// `Url::join` replaces the last path segment unless the base ends in `/`,
/// which would drop a prefix such as `https://gateway/vault`.
fn with_trailing_slash(address: &Url) -> Url {
    let mut base = address.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

/// Extract the username/password pair from a response's `data` object.
fn credential_from_data(data: Option<Map<String, Value>>) -> Result<DbCredential, SecretsError> {
    let data = data.ok_or(SecretsError::Malformed("response has no data"))?;

    // KV v2 wraps the secret in a second `data` object.
    let fields = match data.get("data") {
        Some(Value::Object(inner)) => inner,
        _ => &data,
    };

    let username = fields
        .get("username")
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .ok_or(SecretsError::Malformed("secret has no username"))?;
    let password = fields
        .get("password")
        .and_then(Value::as_str)
        .ok_or(SecretsError::Malformed("secret has no password"))?;

    Ok(DbCredential::new(
        username,
        SecretString::from(password.to_string()),
    ))
}
