//! Storefront configuration loaded from environment variables.
//!
//! Configuration is read once at startup and then shared read-only with every
//! request through [`crate::state::AppState`].
//!
//! # Environment Variables
//!
//! ## Required
//! - `VAULT_ADDR` - Vault server address (e.g., `https://vault.internal:8200`)
//! - `VAULT_TOKEN` - Vault access token
//! - `VAULT_DB_PATH` - Base path of the database secrets (e.g., `database/creds`)
//! - `VAULT_DB_ROLE` - Role appended to the base path (e.g., `bookstore`)
//! - `BOOK_HAVEN_DB_NAME` - `PostgreSQL` database name
//!
//! ## Optional
//! - `VAULT_NAMESPACE` - Vault Enterprise namespace
//! - `VAULT_TIMEOUT_SECS` - Vault request timeout (default: 5)
//! - `BOOK_HAVEN_DB_HOST` - `PostgreSQL` host (default: 127.0.0.1)
//! - `BOOK_HAVEN_DB_PORT` - `PostgreSQL` port (default: 5432)
//! - `BOOK_HAVEN_DB_CONNECT_TIMEOUT_SECS` - Connect timeout (default: 5)
//! - `BOOK_HAVEN_DB_STATEMENT_TIMEOUT_MS` - Server-side statement timeout (default: 5000)
//! - `BOOK_HAVEN_HOST` - Bind address (default: 127.0.0.1)
//! - `BOOK_HAVEN_PORT` - Listen port (default: 5000)
//! - `BOOK_HAVEN_FEATURED_LIMIT` - Books shown on the home page (default: 3)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use crate::services::vault::SecretPath;

/// Number of books shown on the home page unless overridden.
pub const DEFAULT_FEATURED_LIMIT: u32 = 3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Secrets service configuration
    pub vault: VaultConfig,
    /// Static database connection parameters (credentials come from Vault)
    pub database: DatabaseConfig,
    /// Number of books shown on the home page
    pub featured_limit: u32,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Vault configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct VaultConfig {
    /// Vault server address
    pub address: Url,
    /// Vault access token
    pub token: SecretString,
    /// Optional Vault Enterprise namespace
    pub namespace: Option<String>,
    /// Logical path of the database credentials (`{base}/{role}`)
    pub secret_path: SecretPath,
    /// Timeout applied to every Vault request
    pub request_timeout: Duration,
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("address", &self.address.as_str())
            .field("token", &"[REDACTED]")
            .field("namespace", &self.namespace)
            .field("secret_path", &self.secret_path)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Static `PostgreSQL` connection parameters.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database host
    pub host: String,
    /// Database port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Maximum time to establish a connection
    pub connect_timeout: Duration,
    /// Server-side `statement_timeout` for every connection
    pub statement_timeout: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the Vault token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default("BOOK_HAVEN_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("BOOK_HAVEN_PORT", "5000")?;
        let featured_limit =
            parse_env_or_default("BOOK_HAVEN_FEATURED_LIMIT", &DEFAULT_FEATURED_LIMIT.to_string())?;
        if featured_limit == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "BOOK_HAVEN_FEATURED_LIMIT".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            vault: VaultConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            featured_limit,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl VaultConfig {
    /// Load the Vault section from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let address = Url::parse(&get_required_env("VAULT_ADDR")?)
            .map_err(|e| ConfigError::InvalidEnvVar("VAULT_ADDR".to_string(), e.to_string()))?;
        let token = get_validated_secret("VAULT_TOKEN")?;
        let secret_path = SecretPath::from_parts(
            &get_required_env("VAULT_DB_PATH")?,
            &get_required_env("VAULT_DB_ROLE")?,
        )
        .map_err(|e| ConfigError::InvalidEnvVar("VAULT_DB_PATH".to_string(), e.to_string()))?;
        let timeout_secs: u64 = parse_env_or_default("VAULT_TIMEOUT_SECS", "5")?;

        Ok(Self {
            address,
            token,
            namespace: get_optional_env("VAULT_NAMESPACE"),
            secret_path,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl DatabaseConfig {
    /// Load the database section from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let connect_secs: u64 = parse_env_or_default("BOOK_HAVEN_DB_CONNECT_TIMEOUT_SECS", "5")?;
        let statement_ms: u64 = parse_env_or_default("BOOK_HAVEN_DB_STATEMENT_TIMEOUT_MS", "5000")?;

        Ok(Self {
            host: get_env_or_default("BOOK_HAVEN_DB_HOST", "127.0.0.1"),
            port: parse_env_or_default("BOOK_HAVEN_DB_PORT", "5432")?,
            dbname: get_required_env("BOOK_HAVEN_DB_NAME")?,
            connect_timeout: Duration::from_secs(connect_secs),
            statement_timeout: Duration::from_millis(statement_ms),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a secret is not an obvious placeholder.
fn validate_secret_strength(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.trim().is_empty() {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            "must not be empty".to_string(),
        ));
    }

    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = SecretString::from(get_required_env(key)?);
    validate_secret_strength(&value, key)?;
    Ok(value)
}
