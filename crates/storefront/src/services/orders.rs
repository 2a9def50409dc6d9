//! Order writer.
//!
//! A purchase moves from the blank form to one of two terminal states:
//! confirmed (row inserted) or failed (validation or data-access error).
//! [`OrderResult`] carries that outcome to the presentation layer.

use thiserror::Error;
use tracing::instrument;

use book_haven_core::{BookId, NewOrder, OrderFields, OrderId, Quantity, ValidationError};

use crate::db::{ConnectionFactory, OrderRepository, RepositoryError};

/// Outcome of a purchase submission.
pub type OrderResult = Result<Confirmation, OrderError>;

/// A successfully placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub order_id: OrderId,
    pub book_id: BookId,
    pub name: String,
    pub quantity: Quantity,
}

/// Why an order was not placed.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The submission was incomplete or invalid. Nothing was written.
    #[error("invalid order: {0}")]
    Validation(#[from] ValidationError),

    /// Credentials, connection, or insert failed. Nothing was written.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl OrderError {
    /// Whether the customer can fix this by changing their submission.
    #[must_use]
    pub const fn is_customer_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Repository(RepositoryError::UnknownBook(_))
        )
    }

    /// Message suitable for showing to the customer.
    ///
    /// Infrastructure failures get a generic message; their details belong
    /// in the logs, not the page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.user_message(),
            Self::Repository(RepositoryError::UnknownBook(_)) => {
                "Sorry, that book is not available.".to_string()
            }
            Self::Repository(_) => {
                "We couldn't place your order right now. Please try again later.".to_string()
            }
        }
    }
}

/// Validate and record an order for `book_id`.
///
/// Validation runs first, so an invalid submission never fetches
/// credentials or opens a connection.
///
/// # Errors
///
/// Returns `OrderError::Validation` for a bad submission and
/// `OrderError::Repository` if the order could not be stored.
#[instrument(skip(factory, fields), fields(book_id = %book_id))]
pub async fn place_order(
    factory: &ConnectionFactory,
    book_id: BookId,
    fields: &OrderFields,
) -> OrderResult {
    let order = NewOrder::from_fields(book_id, fields)?;

    let mut conn = factory.open_connection().await?;
    let result = OrderRepository::new(&mut conn).insert(&order).await;
    ConnectionFactory::release(conn).await;
    let order_id = result?;

    tracing::info!(
        order_id = %order_id,
        quantity = %order.quantity,
        "Order placed"
    );

    Ok(Confirmation {
        order_id,
        book_id,
        name: order.name,
        quantity: order.quantity,
    })
}
