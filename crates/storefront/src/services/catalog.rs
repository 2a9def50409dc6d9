//! Catalog reader.

use tracing::instrument;

use book_haven_core::Book;

use crate::db::{BookRepository, ConnectionFactory, RepositoryError};

/// Fetch up to `limit` books for the home page.
///
/// Opens one connection for the lookup and releases it before returning,
/// whether or not the query succeeded.
///
/// # Errors
///
/// Returns `RepositoryError` if credentials, the connection, or the query fail.
#[instrument(skip(factory))]
pub async fn list_featured_books(
    factory: &ConnectionFactory,
    limit: u32,
) -> Result<Vec<Book>, RepositoryError> {
    let mut conn = factory.open_connection().await?;
    let result = BookRepository::new(&mut conn).list_featured(limit).await;
    ConnectionFactory::release(conn).await;

    let books = result?;
    tracing::debug!(count = books.len(), "Loaded featured books");
    Ok(books)
}
