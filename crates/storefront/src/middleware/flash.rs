//! Flash messages and the per-page context.
//!
//! Flashes are queued in the session and consumed by the next page that
//! renders them.

use std::borrow::Borrow;

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::warn;

use tienda_core::{CurrencyCode, Price};

use crate::models::{CurrentUser, FlashLevel, FlashMessage, session_keys};
use crate::state::AppState;

/// Queue a flash message for the next rendered page.
///
/// Failures are logged; a lost notice should not fail the request.
pub async fn push_flash(session: &Session, level: FlashLevel, text: impl Into<String>) {
    let mut queued: Vec<FlashMessage> = session
        .get(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    queued.push(FlashMessage::new(level, text));

    if let Err(e) = session.insert(session_keys::FLASH, queued).await {
        warn!(error = %e, "Failed to queue flash message");
    }
}

/// Remove and return all queued flash messages.
///
/// Sessions without queued messages are left unmodified, so anonymous page
/// views do not create a session.
pub async fn take_flashes(session: &Session) -> Vec<FlashMessage> {
    let queued = match session.get::<Vec<FlashMessage>>(session_keys::FLASH).await {
        Ok(Some(queued)) => queued,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read flash messages");
            return Vec::new();
        }
    };

    if let Err(e) = session.remove::<Vec<FlashMessage>>(session_keys::FLASH).await {
        warn!(error = %e, "Failed to clear flash messages");
    }
    queued
}

/// What every page template needs: who is logged in, pending flashes and
/// the display currency.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub flashes: Vec<FlashMessage>,
    pub currency: CurrencyCode,
}

impl PageContext {
    /// Build the context for a page, taking the session's queued flashes.
    ///
    /// Handlers that may redirect instead of rendering call this only on the
    /// render path, so queued flashes survive the redirect.
    pub async fn load(state: &AppState, session: &Session, user: Option<CurrentUser>) -> Self {
        Self {
            user,
            flashes: take_flashes(session).await,
            currency: state.config().currency,
        }
    }

    /// Add a message shown on this render only.
    pub fn flash(&mut self, level: FlashLevel, text: impl Into<String>) {
        self.flashes.push(FlashMessage::new(level, text));
    }

    /// Format a price in the display currency.
    #[must_use]
    pub fn money<P: Borrow<Price>>(&self, price: P) -> String {
        self.currency.format(*price.borrow())
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<CurrentUser>().cloned();
        match parts.extensions.get::<Session>() {
            Some(session) => Ok(Self::load(state, session, user).await),
            None => Ok(Self {
                user,
                flashes: Vec::new(),
                currency: state.config().currency,
            }),
        }
    }
}
