//! Purchase flow route handlers.
//!
//! `GET` shows the blank order form; `POST` hands the submission to the
//! order writer and renders the confirmation or the failure page. Both
//! outcomes of a submission are ordinary pages, so they are served with 200.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use book_haven_core::{BookId, OrderFields, OrderId, Quantity};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::services::{OrderResult, place_order};
use crate::state::AppState;

/// Blank order form.
#[derive(Template, WebTemplate)]
#[template(path = "buy/form.html")]
pub struct OrderFormTemplate {
    pub book_id: BookId,
}

/// Order placed.
#[derive(Template, WebTemplate)]
#[template(path = "buy/confirmation.html")]
pub struct ConfirmationTemplate {
    pub order_id: OrderId,
    pub book_id: BookId,
    pub name: String,
    pub quantity: Quantity,
}

/// Order not placed.
#[derive(Template, WebTemplate)]
#[template(path = "buy/failed.html")]
pub struct OrderFailedTemplate {
    pub book_id: BookId,
    pub message: String,
    /// Whether resubmitting the form could succeed.
    pub retry: bool,
}

/// The raw `{book_id}` segment, kept fallible so decode failures become 404s.
type BookIdSegment = std::result::Result<Path<String>, PathRejection>;

/// Parse the `{book_id}` path segment; anything but a positive integer is a 404.
fn parse_book_id(raw: &str) -> Result<BookId> {
    BookId::from_path_segment(raw).ok_or_else(|| AppError::NotFound(format!("/buy/{raw}")))
}

/// Resolve the extracted segment. A segment axum cannot decode (for example
/// percent-encoded bytes that are not UTF-8) is a 404 like any other bad id.
fn book_id_from(path: BookIdSegment) -> Result<BookId> {
    match path {
        Ok(Path(raw)) => parse_book_id(&raw),
        Err(rejection) => Err(AppError::NotFound(format!(
            "undecodable book id: {}",
            rejection.body_text()
        ))),
    }
}

/// Display the order form.
///
/// GET /buy/{book_id}
#[instrument]
pub async fn form(path: BookIdSegment) -> Result<OrderFormTemplate> {
    let book_id = book_id_from(path)?;
    Ok(OrderFormTemplate { book_id })
}

/// Place an order.
///
/// POST /buy/{book_id}
#[instrument(skip(state, fields))]
pub async fn submit(
    State(state): State<AppState>,
    path: BookIdSegment,
    Form(fields): Form<OrderFields>,
) -> Result<Response> {
    let book_id = book_id_from(path)?;
    add_breadcrumb(
        "order",
        "Submitted order form",
        Some(&[("book_id", &book_id.to_string())]),
    );

    let outcome = place_order(state.connections(), book_id, &fields).await;
    Ok(render_outcome(book_id, outcome))
}

fn render_outcome(book_id: BookId, outcome: OrderResult) -> Response {
    match outcome {
        Ok(confirmation) => ConfirmationTemplate {
            order_id: confirmation.order_id,
            book_id: confirmation.book_id,
            name: confirmation.name,
            quantity: confirmation.quantity,
        }
        .into_response(),
        Err(err) => {
            if err.is_customer_error() {
                tracing::info!(error = %err, "Order rejected");
            } else {
                let event_id = sentry::capture_error(&err);
                tracing::error!(
                    error = %err,
                    sentry_event_id = %event_id,
                    "Order failed"
                );
            }

            OrderFailedTemplate {
                book_id,
                message: err.user_message(),
                retry: err.is_customer_error(),
            }
            .into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use book_haven_core::{OrderField, ValidationError};

    use super::*;
    use crate::db::RepositoryError;
    use crate::services::{Confirmation, OrderError, SecretsError};

    async fn body_of(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_parse_book_id() {
        assert_eq!(parse_book_id("12").unwrap(), BookId::new(12));
        assert!(matches!(parse_book_id("abc"), Err(AppError::NotFound(_))));
        assert!(matches!(parse_book_id("0"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_form_posts_back_to_book() {
        let html = OrderFormTemplate {
            book_id: BookId::new(4),
        }
        .render()
        .unwrap();
        assert!(html.contains(r#"action="/buy/4""#));
        for field in ["name", "email", "phone", "address", "quantity"] {
            assert!(html.contains(&format!(r#"name="{field}""#)));
        }
    }

    #[tokio::test]
    async fn test_confirmation_escapes_name() {
        let outcome = Ok(Confirmation {
            order_id: OrderId::new(31),
            book_id: BookId::new(2),
            name: "<script>steal()</script>".to_string(),
            quantity: Quantity::new(2).unwrap(),
        });
        let (status, body) = body_of(render_outcome(BookId::new(2), outcome)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Thank you, &#60;script&#62;"));
        assert!(!body.contains("<script>steal()"));
        assert!(body.contains("Order #31"));
        assert!(body.contains(r#"href="/buy/2""#));
    }

    #[tokio::test]
    async fn test_validation_failure_page() {
        let outcome = Err(OrderError::from(ValidationError::MissingField(
            OrderField::Address,
        )));
        let (status, body) = body_of(render_outcome(BookId::new(2), outcome)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Please provide a shipping address."));
        assert!(body.contains(r#"href="/buy/2""#));
    }

    #[tokio::test]
    async fn test_infrastructure_failure_page_is_generic() {
        let outcome = Err(OrderError::from(RepositoryError::SecretUnavailable(
            SecretsError::Unauthorized("database/creds/bookstore".to_string()),
        )));
        let (status, body) = body_of(render_outcome(BookId::new(2), outcome)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("try again later"));
        assert!(!body.contains("database/creds"));
        assert!(!body.contains("Back to the order form"));
    }
}
