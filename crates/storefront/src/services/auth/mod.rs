//! Authentication service.
//!
//! Password registration and login with Argon2id hashes, plus the profile
//! update. Session handling lives in the route layer.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use tienda_core::{Email, UserId, UserRole};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new customer account.
    ///
    /// Name, email and password are required (blank after trimming counts as
    /// missing). The email is normalized before the duplicate check.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if a field is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let name = name.trim();
        if name.is_empty() || email.trim().is_empty() || password.trim().is_empty() {
            return Err(AuthError::MissingFields);
        }

        let email = Email::parse(email)?;

        if self.users.exists(&email).await? {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password)?;

        // A concurrent registration can still slip past the pre-check; the
        // unique index is the final word.
        let user = self
            .users
            .create(name, &email, &password_hash, UserRole::Customer)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong,
    /// including when the email cannot be parsed.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let found = self
            .users
            .get_with_password(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &found.password_hash)?;

        Ok(found.user)
    }

    /// Update the display name. Email, role and password are untouched.
    ///
    /// `None` keeps the current name.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::BlankName` if the new name is blank.
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        name: Option<&str>,
    ) -> Result<User, AuthError> {
        let Some(name) = name else {
            return self.get_user(user_id).await;
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::BlankName);
        }

        self.users
            .update_name(user_id, name)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Hash a password using Argon2id with a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the hash is malformed or does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Where to send the user after login.
///
/// Only local absolute paths are honoured; anything that could leave the
/// site (`//host`, `/\host`, full URLs) falls back to `/`.
#[must_use]
pub fn safe_redirect_target(next: Option<&str>) -> &str {
    match next.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}
