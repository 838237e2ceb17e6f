//! User domain types.

use chrono::{DateTime, Utc};

use tienda_core::{Email, UserId, UserRole};

/// A storefront account (domain type).
///
/// The password hash is deliberately not part of this type; it is only
/// loaded by the login path (see `UserRepository::get_with_password`).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Normalized (lower-cased) email address.
    pub email: Email,
    /// Account role.
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A user row together with its stored password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserWithPassword {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}
