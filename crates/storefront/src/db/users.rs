//! User repository for database operations.

use sqlx::PgPool;

use tienda_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::user::{User, UserWithPassword};

const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user together with their password hash (login only).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<UserWithPassword>, RepositoryError> {
        let user = sqlx::query_as::<_, UserWithPassword>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Check whether an account with this email exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Create a new user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "email already exists"))
    }

    /// Update a user's display name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_name(&self, id: UserId, name: &str) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = $2, updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_role(&self, id: UserId, role: UserRole) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2, updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Count all users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
