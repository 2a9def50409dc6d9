//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use book_haven_core::Book;

use crate::error::Result;
use crate::filters;
use crate::services::list_featured_books;
use crate::state::AppState;

/// Home page template: one card per featured book.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub books: Vec<Book>,
}

/// Display the home page.
///
/// GET /
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<HomeTemplate> {
    let books = list_featured_books(state.connections(), state.config().featured_limit).await?;
    Ok(HomeTemplate { books })
}
