//! Database access for the Book Haven `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `books` - Catalog (read-only from the storefront)
//! - `customers` - Placed orders (append-only)
//!
//! # Connections
//!
//! There is no pool. Each request opens one connection through
//! [`ConnectionFactory`], authenticating with a credential fetched from Vault
//! for that connection alone, and hands it back to
//! [`ConnectionFactory::release`] once its queries are done.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p book-haven-cli -- migrate
//! ```

pub mod books;
pub mod orders;

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use thiserror::Error;
use tracing::instrument;

use book_haven_core::BookId;

pub use books::BookRepository;
pub use orders::OrderRepository;

use crate::config::DatabaseConfig;
use crate::services::vault::{CredentialSource, DbCredential, SecretPath, SecretsError};

/// `application_name` reported to `PostgreSQL`.
const APPLICATION_NAME: &str = "book-haven-storefront";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Credentials could not be fetched from the secrets service.
    #[error("secret unavailable: {0}")]
    SecretUnavailable(#[from] SecretsError),

    /// Connecting or authenticating to the database failed.
    #[error("could not connect to {target}: {reason}")]
    Connection { target: String, reason: String },

    /// The connection attempt did not finish in time.
    #[error("connecting to {target} timed out after {timeout:?}")]
    ConnectTimeout { target: String, timeout: Duration },

    /// A query failed.
    #[error("query error: {0}")]
    Query(#[from] sqlx::Error),

    /// The referenced book does not exist.
    #[error("book {0} does not exist")]
    UnknownBook(BookId),
}

impl RepositoryError {
    /// Whether the failure happened before a connection was established.
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::SecretUnavailable(_) | Self::Connection { .. } | Self::ConnectTimeout { .. }
        )
    }
}

/// Opens request-scoped database connections with freshly fetched credentials.
///
/// Cheap to clone; holds only the static connection parameters and a handle
/// to the credential source.
#[derive(Clone)]
pub struct ConnectionFactory {
    database: DatabaseConfig,
    secret_path: SecretPath,
    secrets: Arc<dyn CredentialSource>,
}

impl std::fmt::Debug for ConnectionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionFactory")
            .field("database", &self.database)
            .field("secret_path", &self.secret_path)
            .finish_non_exhaustive()
    }
}

impl ConnectionFactory {
    /// Create a new connection factory.
    #[must_use]
    pub fn new(
        database: DatabaseConfig,
        secret_path: SecretPath,
        secrets: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            database,
            secret_path,
            secrets,
        }
    }

    /// `host:port/dbname` of the target database, for diagnostics.
    #[must_use]
    pub fn target(&self) -> String {
        format!(
            "{}:{}/{}",
            self.database.host, self.database.port, self.database.dbname
        )
    }

    /// Open a new connection.
    ///
    /// Fetches a fresh credential on every call. The caller must pass the
    /// returned connection to [`Self::release`] when done.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::SecretUnavailable` if the credential cannot be
    /// fetched, `RepositoryError::Connection` if the database refuses the
    /// connection, or `RepositoryError::ConnectTimeout` if it does not answer.
    #[instrument(skip(self), fields(target = %self.target()))]
    pub async fn open_connection(&self) -> Result<PgConnection, RepositoryError> {
        let credential = self.secrets.fetch_credentials(&self.secret_path).await?;
        let options = self.connect_options(&credential);
        let timeout = self.database.connect_timeout;

        match tokio::time::timeout(timeout, PgConnection::connect_with(&options)).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => Err(RepositoryError::Connection {
                target: self.target(),
                reason: describe_connect_error(&e),
            }),
            Err(_) => Err(RepositoryError::ConnectTimeout {
                target: self.target(),
                timeout,
            }),
        }
    }

    /// Close a connection obtained from [`Self::open_connection`].
    ///
    /// Close failures are logged and otherwise ignored; the socket is gone
    /// either way.
    pub async fn release(conn: PgConnection) {
        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "Failed to close database connection cleanly");
        }
    }

    fn connect_options(&self, credential: &DbCredential) -> PgConnectOptions {
        let statement_timeout_ms = self.database.statement_timeout.as_millis();

        PgConnectOptions::new()
            .host(&self.database.host)
            .port(self.database.port)
            .database(&self.database.dbname)
            .username(credential.username())
            .password(credential.password().expose_secret())
            .application_name(APPLICATION_NAME)
            .options([("statement_timeout", statement_timeout_ms.to_string())])
    }
}

/// Summarise a connect error without echoing server messages.
///
/// `PostgreSQL` authentication errors quote the role name, which is a
/// Vault-issued credential; only the SQLSTATE code is kept for those.
fn describe_connect_error(error: &sqlx::Error) -> String {
    match error {
        sqlx::Error::Database(db_err) => db_err.code().map_or_else(
            || "database rejected the connection".to_string(),
            |code| format!("database rejected the connection (SQLSTATE {code})"),
        ),
        sqlx::Error::Io(io_err) => format!("i/o error: {}", io_err.kind()),
        sqlx::Error::Tls(_) => "tls handshake failed".to_string(),
        sqlx::Error::Protocol(_) => "protocol error".to_string(),
        _ => "connection failed".to_string(),
    }
}
