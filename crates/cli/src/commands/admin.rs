//! Admin account commands.
//!
//! Accounts created here log in through the normal `/auth/login` form.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use tienda_core::{Email, UserId, UserRole};
use tienda_storefront::db::{RepositoryError, UserRepository};
use tienda_storefront::services::auth::hash_password;

use super::CommandError;

/// Create a new admin account.
///
/// # Returns
///
/// The ID of the created user.
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    name: &str,
    password: &SecretString,
) -> Result<UserId, CommandError> {
    let email = Email::parse(email)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::InvalidInput("name must not be empty"));
    }
    if password.expose_secret().is_empty() {
        return Err(CommandError::InvalidInput("password must not be empty"));
    }

    let users = UserRepository::new(pool);
    if users.exists(&email).await? {
        return Err(CommandError::UserExists(email.into_inner()));
    }

    let hash = hash_password(password.expose_secret())?;
    let user = match users.create(name, &email, &hash, UserRole::Admin).await {
        Ok(user) => user,
        Err(RepositoryError::Conflict(_)) => {
            return Err(CommandError::UserExists(email.into_inner()));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}

/// Give an existing account the admin role.
pub async fn promote(pool: &PgPool, email: &str) -> Result<(), CommandError> {
    let email = Email::parse(email)?;
    let users = UserRepository::new(pool);

    let Some(user) = users.get_by_email(&email).await? else {
        return Err(CommandError::UserNotFound(email.into_inner()));
    };

    if user.role.is_admin() {
        tracing::info!("{} is already an admin", user.email);
        return Ok(());
    }

    let user = users.set_role(user.id, UserRole::Admin).await?;
    tracing::info!("{} is now an admin", user.email);
    Ok(())
}
