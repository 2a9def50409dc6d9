//! Catalog book type.

use serde::{Deserialize, Serialize};

use super::{BookId, Price};

/// A book as listed in the catalog.
///
/// Books are read-only from the application's point of view; their lifecycle
/// is owned by whoever maintains the `books` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: Price,
    pub image_url: String,
}

impl Book {
    /// Path of the purchase form for this book. Contains only ASCII digits
    /// after the prefix, so it needs no escaping.
    #[must_use]
    pub fn buy_path(&self) -> String {
        format!("/buy/{}", self.id)
    }
}
