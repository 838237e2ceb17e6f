//! Tienda Core - Shared types library.
//!
//! This crate provides common types used across all Tienda components:
//! - `storefront` - The web application (catalog, cart, orders, auth, admin)
//! - `cli` - Command-line tools for migrations, seeding and admin accounts
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. With the `postgres` feature the types also implement the
//! sqlx encode/decode traits so repositories can bind them directly.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, roles and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
