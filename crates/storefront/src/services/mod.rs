//! Business logic services for storefront.
//!
//! # Services
//!
//! - `vault` - Dynamic database credentials from Vault
//! - `catalog` - Featured books for the home page
//! - `orders` - Order validation and placement

pub mod catalog;
pub mod orders;
pub mod vault;

pub use catalog::list_featured_books;
pub use orders::{Confirmation, OrderError, OrderResult, place_order};
pub use vault::{CredentialSource, DbCredential, SecretPath, SecretsError, VaultClient};
