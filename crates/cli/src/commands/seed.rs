//! Seed the catalog with sample books.
//!
//! Only touches an empty `books` table, so running it twice is harmless.

use rust_decimal::Decimal;
use sqlx::{Connection, PgConnection};

use book_haven_storefront::db::ConnectionFactory;

use super::{CommandError, connection_factory};

/// A sample catalog entry.
struct SampleBook {
    title: &'static str,
    author: &'static str,
    /// Price in cents.
    cents: i64,
    image_url: &'static str,
}

const SAMPLE_BOOKS: &[SampleBook] = &[
    SampleBook {
        title: "Pride and Prejudice",
        author: "Jane Austen",
        cents: 999,
        image_url: "https://covers.openlibrary.org/b/id/8091016-L.jpg",
    },
    SampleBook {
        title: "Moby-Dick",
        author: "Herman Melville",
        cents: 1299,
        image_url: "https://covers.openlibrary.org/b/id/5551661-L.jpg",
    },
    SampleBook {
        title: "Frankenstein",
        author: "Mary Shelley",
        cents: 849,
        image_url: "https://covers.openlibrary.org/b/id/6788866-L.jpg",
    },
    SampleBook {
        title: "The Adventures of Sherlock Holmes",
        author: "Arthur Conan Doyle",
        cents: 1099,
        image_url: "https://covers.openlibrary.org/b/id/6717853-L.jpg",
    },
];

/// Insert the sample catalog if `books` is empty.
///
/// # Errors
///
/// Returns an error if no connection can be opened or an insert fails.
pub async fn books() -> Result<(), CommandError> {
    let factory = connection_factory()?;
    let mut conn = factory.open_connection().await?;

    let result = insert_if_empty(&mut conn).await;
    ConnectionFactory::release(conn).await;

    match result? {
        0 => tracing::info!("Catalog already has books, nothing seeded"),
        inserted => tracing::info!(inserted, "Seeded sample catalog"),
    }
    Ok(())
}

async fn insert_if_empty(conn: &mut PgConnection) -> Result<usize, sqlx::Error> {
    let mut tx = conn.begin().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(&mut *tx)
        .await?;
    if existing > 0 {
        return Ok(0);
    }

    for book in SAMPLE_BOOKS {
        sqlx::query("INSERT INTO books (title, author, price, image_url) VALUES ($1, $2, $3, $4)")
            .bind(book.title)
            .bind(book.author)
            .bind(Decimal::new(book.cents, 2))
            .bind(book.image_url)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(SAMPLE_BOOKS.len())
}
