//! Domain models for the storefront.
//!
//! Row types derive `sqlx::FromRow` and are used directly as domain types;
//! form input types validate into the `*Input` structs the repositories take.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod session;
pub mod user;

pub use cart::{Cart, CartLine};
pub use catalog::{Category, CategoryWithCount, Product, ProductFilter, ProductForm, ProductInput};
pub use order::{Order, OrderItem, OrderSummary, OrderWithItems};
pub use session::{CurrentUser, FlashLevel, FlashMessage, keys as session_keys};
pub use user::User;
