//! Catalog queries.

use rust_decimal::Decimal;
use sqlx::PgConnection;

use book_haven_core::{Book, BookId, Price};

use super::RepositoryError;

/// Row shape of the `books` table.
#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: BookId,
    title: String,
    author: String,
    price: Decimal,
    image_url: Option<String>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author: row.author,
            price: Price::from_amount(row.price),
            image_url: row.image_url.unwrap_or_default(),
        }
    }
}

/// Repository for reading the book catalog.
pub struct BookRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> BookRepository<'c> {
    /// Create a new book repository on an open connection.
    #[must_use]
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// List up to `limit` books in the table's natural row order.
    ///
    /// No `ORDER BY` is applied; which books appear is up to the store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Query` if the query fails.
    pub async fn list_featured(&mut self, limit: u32) -> Result<Vec<Book>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookRow>(
            r"
            SELECT id, title, author, price, image_url
            FROM books
            LIMIT $1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }
}
