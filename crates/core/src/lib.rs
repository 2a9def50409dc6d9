//! Book Haven Core - Shared types library.
//!
//! This crate provides common types used across all Book Haven components:
//! - `storefront` - Public-facing book shop
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. Validation of order submissions lives here so it
//! can run before any credential is fetched or connection opened.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, books, and order validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
