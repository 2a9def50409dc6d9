//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::ConnectionFactory;
use crate::services::vault::{CredentialSource, SecretsError, VaultClient};

/// Application state shared across all handlers.
///
/// Built once at startup and never mutated. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    connections: ConnectionFactory,
}

impl AppState {
    /// Create application state backed by the configured Vault server.
    ///
    /// # Errors
    ///
    /// Returns an error if the Vault client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, SecretsError> {
        let vault = VaultClient::new(&config.vault)?;
        Ok(Self::with_credential_source(config, Arc::new(vault)))
    }

    /// Create application state with an explicit credential source.
    #[must_use]
    pub fn with_credential_source(
        config: StorefrontConfig,
        secrets: Arc<dyn CredentialSource>,
    ) -> Self {
        let connections = ConnectionFactory::new(
            config.database.clone(),
            config.vault.secret_path.clone(),
            secrets,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                connections,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the connection factory.
    #[must_use]
    pub fn connections(&self) -> &ConnectionFactory {
        &self.inner.connections
    }
}
