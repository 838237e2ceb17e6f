//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required form field was missing or blank.
    #[error("missing required fields")]
    MissingFields,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] tienda_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Display name was blank.
    #[error("name must not be blank")]
    BlankName,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message shown on the re-rendered form, or `None` for server errors.
    #[must_use]
    pub const fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::MissingFields => Some("Completa todos los campos"),
            Self::InvalidEmail(_) => Some("Correo electrónico inválido"),
            Self::InvalidCredentials => Some("Correo o contraseña incorrectos"),
            Self::UserAlreadyExists => Some("Este correo ya está registrado"),
            Self::BlankName => Some("El nombre no puede estar vacío"),
            Self::UserNotFound | Self::Repository(_) | Self::PasswordHash => None,
        }
    }
}
