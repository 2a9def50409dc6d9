//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use url::Url;

/// Cover shown when a book has no usable image URL.
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/300x450?text=No+Cover";

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the image URL if it is an absolute `http`/`https` URL, otherwise
/// the placeholder cover.
///
/// Usage in templates: `{{ book.image_url|image_src }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn image_src(url: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(safe_image_url(&url.to_string()))
}

/// Keep only `http`/`https` image URLs so stored data cannot smuggle a
/// `javascript:` or `data:` URL into an attribute.
#[must_use]
pub fn safe_image_url(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => String::from(url),
        _ => PLACEHOLDER_IMAGE.to_string(),
    }
}
