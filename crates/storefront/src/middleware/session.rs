//! Session middleware configuration.
//!
//! Sessions live in `PostgreSQL` (`tower_sessions` schema) and the cookie is
//! signed with a key derived from `SECRET_KEY`.

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use tower_sessions::cookie::{Key, SameSite, time::Duration};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "tienda_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over any store.
///
/// Production passes a `PostgresStore`; tests pass a `MemoryStore`.
#[must_use]
pub fn create_session_layer<S>(
    store: S,
    config: &StorefrontConfig,
) -> SessionManagerLayer<S, SignedCookie>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            SESSION_EXPIRY_SECONDS,
        )))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config))
}

/// Derive the 64-byte cookie signing key from the configured secret.
fn signing_key(config: &StorefrontConfig) -> Key {
    let digest = Sha512::digest(config.secret_key.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}
