//! Session-related types.
//!
//! Only the user id lives in the session; the full [`CurrentUser`] is
//! resolved from the database on each request by
//! `middleware::auth::resolve_current_user`.

use serde::{Deserialize, Serialize};

use tienda_core::{Email, UserId, UserRole};

use super::User;

/// The authenticated user attached to a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
}

impl CurrentUser {
    /// Returns true for administrators.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Severity of a flash message; doubles as the CSS modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    /// CSS class for the alert box.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "alert alert-success",
            Self::Info => "alert alert-info",
            Self::Warning => "alert alert-warning",
            Self::Danger => "alert alert-danger",
        }
    }
}

/// A one-time notice shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    #[must_use]
    pub fn new(level: FlashLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    /// CSS class for the alert box.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        self.level.css_class()
    }
}

/// Session keys.
pub mod keys {
    /// Key for the logged-in user's id.
    pub const USER_ID: &str = "user_id";

    /// Key for queued flash messages.
    pub const FLASH: &str = "_flash";
}
