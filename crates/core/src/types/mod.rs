//! Core types for Book Haven.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod book;
pub mod id;
pub mod order;
pub mod price;

pub use book::Book;
pub use id::*;
pub use order::{NewOrder, OrderField, OrderFields, Quantity, ValidationError};
pub use price::Price;
