//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! bh-cli migrate
//! ```
//!
//! Connects with a Vault-issued credential (the role behind `VAULT_DB_ROLE`
//! needs DDL rights for this) and applies `crates/storefront/migrations/`.

use book_haven_storefront::db::ConnectionFactory;

use super::{CommandError, connection_factory};

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if no connection can be opened or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let factory = connection_factory()?;

    tracing::info!(target = %factory.target(), "Connecting to storefront database...");
    let mut conn = factory.open_connection().await?;

    tracing::info!("Running storefront migrations...");
    let result = sqlx::migrate!("../storefront/migrations")
        .run(&mut conn)
        .await;
    ConnectionFactory::release(conn).await;
    result?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
