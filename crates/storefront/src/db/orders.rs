//! Order persistence.
//!
//! Orders land in the `customers` table, one row per submission.

use sqlx::PgConnection;

use book_haven_core::{NewOrder, OrderId};

use super::RepositoryError;

/// Repository for recording orders.
pub struct OrderRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> OrderRepository<'c> {
    /// Create a new order repository on an open connection.
    #[must_use]
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Insert an order and return its ID.
    ///
    /// A single autocommitted statement: either the row is written or
    /// nothing is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::UnknownBook` if the store rejects the book
    /// reference, or `RepositoryError::Query` for other database errors.
    pub async fn insert(&mut self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let (id,): (OrderId,) = sqlx::query_as(
            r"
            INSERT INTO customers (name, email, phone, address, book_id, quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(&order.name)
        .bind(&order.email)
        .bind(order.phone.as_deref())
        .bind(&order.address)
        .bind(order.book_id)
        .bind(order.quantity.get())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::UnknownBook(order.book_id);
            }
            RepositoryError::Query(e)
        })?;

        Ok(id)
    }
}
