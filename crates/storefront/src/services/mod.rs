//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, password login and profile updates
//! - `orders` - Checkout and order lifecycle
//! - `seed` - Baseline admin, categories and sample products

pub mod auth;
pub mod orders;
pub mod seed;

pub use auth::{AuthError, AuthService};
pub use orders::{OrderError, OrderService};
pub use seed::{SeedError, SeedOptions, SeedReport};
