//! CLI subcommands.

pub mod migrate;
pub mod seed;

use std::sync::Arc;

use thiserror::Error;

use book_haven_storefront::config::{ConfigError, StorefrontConfig};
use book_haven_storefront::db::{ConnectionFactory, RepositoryError};
use book_haven_storefront::services::{SecretsError, VaultClient};

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("secrets error: {0}")]
    Secrets(#[from] SecretsError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Build the same Vault-backed connection factory the storefront uses.
///
/// # Errors
///
/// Returns an error if configuration is missing or the Vault client cannot be
/// built.
pub fn connection_factory() -> Result<ConnectionFactory, CommandError> {
    let config = StorefrontConfig::from_env()?;
    let vault = VaultClient::new(&config.vault)?;

    tracing::info!(
        vault = %config.vault.address,
        secret_path = %config.vault.secret_path,
        "Using Vault-issued database credentials"
    );

    Ok(ConnectionFactory::new(
        config.database,
        config.vault.secret_path,
        Arc::new(vault),
    ))
}
