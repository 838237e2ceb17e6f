//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SECRET_KEY` - Session cookie signing secret (min 32 chars, high entropy)
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://localhost:3000`)
//! - `STOREFRONT_LOG_STATEMENTS` - `true` to log every SQL statement (default: false)
//! - `STOREFRONT_BOOTSTRAP` - Run migrations and seeding on startup (default: true)
//! - `STOREFRONT_SEED_ADMIN_EMAIL` - Seed admin email (default: admin@tienda.com)
//! - `STOREFRONT_SEED_ADMIN_PASSWORD` - Seed admin password (default: admin123)
//! - `STOREFRONT_SEED_RESET_PRODUCTS` - Clear and reinsert sample products when seeding
//! - `STOREFRONT_CURRENCY` - Display currency: COP, USD or EUR (default: COP)
//! - `STOREFRONT_STATIC_DIR` - Static asset directory (default: crates/storefront/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry performance sample rate (default: 0.0)
//!
//! Boolean variables are true only when set to exactly `true`.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use tienda_core::{CurrencyCode, Email};

use crate::services::seed::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};

const MIN_SECRET_KEY_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Log every SQL statement at debug level
    pub log_statements: bool,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Session cookie signing secret
    pub secret_key: SecretString,
    /// Display currency for prices
    pub currency: CurrencyCode,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Startup bootstrap (migrations + seed data)
    pub bootstrap: BootstrapConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Sentry performance sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Startup bootstrap settings.
///
/// Implements `Debug` manually to redact the admin password.
#[derive(Clone)]
pub struct BootstrapConfig {
    /// Run migrations and the seed routine at startup
    pub enabled: bool,
    /// Email of the seeded admin account
    pub admin_email: Email,
    /// Password of the seeded admin account
    pub admin_password: SecretString,
    /// Clear and reinsert the sample products on every seed
    pub reset_products: bool,
}

impl std::fmt::Debug for BootstrapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapConfig")
            .field("enabled", &self.enabled)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &"[REDACTED]")
            .field("reset_products", &self.reset_products)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the secret key fails validation (length, placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let database_url = env
            .get("STOREFRONT_DATABASE_URL")
            .or_else(|| env.get("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_owned()))?;

        let secret_key = env.required("SECRET_KEY")?;
        validate_secret_key(&secret_key, "SECRET_KEY")?;
        let secret_key = SecretString::from(secret_key);

        let host = env.parsed("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parsed("STOREFRONT_PORT", "3000")?;
        let base_url = env.parsed("STOREFRONT_BASE_URL", "http://localhost:3000")?;
        let currency = env.parsed("STOREFRONT_CURRENCY", "COP")?;

        let bootstrap = BootstrapConfig {
            enabled: env.flag("STOREFRONT_BOOTSTRAP", true),
            admin_email: env.parsed("STOREFRONT_SEED_ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL)?,
            admin_password: SecretString::from(
                env.get("STOREFRONT_SEED_ADMIN_PASSWORD")
                    .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_owned()),
            ),
            reset_products: env.flag("STOREFRONT_SEED_RESET_PRODUCTS", false),
        };

        Ok(Self {
            database_url,
            log_statements: env.flag("STOREFRONT_LOG_STATEMENTS", false),
            host,
            port,
            base_url,
            secret_key,
            currency,
            static_dir: PathBuf::from(
                env.get("STOREFRONT_STATIC_DIR")
                    .unwrap_or_else(|| "crates/storefront/static".to_owned()),
            ),
            bootstrap,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
            sentry_traces_sample_rate: env.parsed("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable; empty values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_owned()))
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .unwrap_or_else(|| default.to_owned())
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
    }

    /// Boolean flag: true only for the literal `true`.
    fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key).map_or(default, |v| v.trim() == "true")
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that the secret key is long, not a placeholder, and has sufficient entropy.
fn validate_secret_key(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SECRET_KEY_LENGTH,
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
