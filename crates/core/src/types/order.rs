//! Order submission types and validation.
//!
//! A purchase form arrives as [`OrderFields`] (every field optional, exactly
//! as the browser sent it). [`NewOrder::from_fields`] turns it into a
//! validated order or a [`ValidationError`] naming the offending field.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::BookId;

/// Form fields an order submission may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderField {
    Name,
    Email,
    Phone,
    Address,
    Quantity,
}

impl OrderField {
    /// Form key for this field.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::Quantity => "quantity",
        }
    }

    /// Human-readable label used in error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "your name",
            Self::Email => "an email address",
            Self::Phone => "a phone number",
            Self::Address => "a shipping address",
            Self::Quantity => "a quantity",
        }
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Errors produced while validating an order submission.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent or blank.
    #[error("missing required field: {0}")]
    MissingField(OrderField),
    /// The quantity is not an integer.
    #[error("quantity must be a whole number (got {0:?})")]
    QuantityNotANumber(String),
    /// The quantity is zero or negative.
    #[error("quantity must be at least 1 (got {0})")]
    QuantityNotPositive(i64),
}

impl ValidationError {
    /// Message suitable for showing to the customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingField(field) => format!("Please provide {}.", field.label()),
            Self::QuantityNotANumber(_) => "Quantity must be a whole number.".to_string(),
            Self::QuantityNotPositive(_) => "Quantity must be at least 1.".to_string(),
        }
    }
}

/// A positive order quantity.
///
/// Bounded by `i32::MAX` so it fits the `INTEGER` column it is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// Create a quantity, rejecting values below 1.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::QuantityNotPositive` if `value < 1`.
    pub fn new(value: i32) -> Result<Self, ValidationError> {
        if value < 1 {
            return Err(ValidationError::QuantityNotPositive(i64::from(value)));
        }
        Ok(Self(value))
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl FromStr for Quantity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = trimmed
            .parse::<i64>()
            .map_err(|_| ValidationError::QuantityNotANumber(trimmed.to_string()))?;
        if value < 1 {
            return Err(ValidationError::QuantityNotPositive(value));
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| ValidationError::QuantityNotANumber(trimmed.to_string()))
    }
}

impl TryFrom<i32> for Quantity {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw purchase form submission.
///
/// Every field is optional so that a missing field surfaces as a
/// [`ValidationError`] rather than a form-decoding rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
}

/// A validated order, ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub book_id: BookId,
    pub quantity: Quantity,
}

impl NewOrder {
    /// Validate a form submission for the given book.
    ///
    /// Text fields are trimmed. `name`, `email` and `address` must be
    /// non-empty; `phone` is optional and a blank phone becomes `None`.
    /// No format checks are applied beyond that.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found, checking fields in form
    /// order: name, email, address, quantity.
    pub fn from_fields(book_id: BookId, fields: &OrderFields) -> Result<Self, ValidationError> {
        let name = required(fields.name.as_deref(), OrderField::Name)?;
        let email = required(fields.email.as_deref(), OrderField::Email)?;
        let address = required(fields.address.as_deref(), OrderField::Address)?;
        let quantity = required(fields.quantity.as_deref(), OrderField::Quantity)?.parse()?;
        let phone = fields
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(Self {
            name,
            email,
            phone,
            address,
            book_id,
            quantity,
        })
    }
}

fn required(value: Option<&str>, field: OrderField) -> Result<String, ValidationError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ValidationError::MissingField(field))
}
