//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span, echoed in the response)
//! 4. Security headers
//! 5. Session layer (tower-sessions, signed cookie)
//! 6. Current-user resolution (session user id → `CurrentUser`)

pub mod auth;
pub mod flash;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AuthRejection, OptionalAuth, RequireAdmin, RequireAuth, login_url, login_user, logout_user,
    resolve_current_user,
};
pub use flash::{PageContext, push_flash, take_flashes};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
