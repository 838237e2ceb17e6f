//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server errors are captured to
//! Sentry and logged; the client always gets a generic HTML error page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::filters;
use crate::middleware::PageContext;
use crate::services::{AuthError, OrderError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authenticated but not allowed.
    #[error("Forbidden")]
    Forbidden,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// What an error response shows. Attached to the response so the page can
/// be rendered again with the request's user and currency
/// (see [`crate::middleware::resolve_current_user`]).
#[derive(Debug, Clone, Copy)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub title: &'static str,
    pub message: &'static str,
}

impl ErrorPage {
    /// Generic title and message for a status. Never includes error details.
    #[must_use]
    pub fn for_status(status: StatusCode) -> Self {
        let (title, message) = match status.as_u16() {
            404 => ("Página no encontrada", "Lo que buscas no existe o ya no está disponible."),
            403 => ("Acceso denegado", "No tienes permiso para ver esta página."),
            400 => ("Solicitud inválida", "Revisa los datos enviados e inténtalo de nuevo."),
            401 => ("No autorizado", "Inicia sesión para continuar."),
            409 => ("Conflicto", "La operación no se pudo completar."),
            _ => ("Error del servidor", "Ocurrió un error inesperado. Inténtalo más tarde."),
        };
        Self {
            status,
            title,
            message,
        }
    }

    /// Render the error page within `page`.
    #[must_use]
    pub fn render(self, page: PageContext) -> Response {
        let template = ErrorTemplate {
            page,
            status: self.status.as_u16(),
            title: self.title,
            message: self.message,
        };
        let mut response = (self.status, template).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Generic error page.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub page: PageContext,
    pub status: u16,
    pub title: &'static str,
    pub message: &'static str,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_)
            | Self::Database(RepositoryError::NotFound)
            | Self::Auth(AuthError::UserNotFound)
            | Self::Order(OrderError::NotFound) => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_)
            | Self::Auth(AuthError::MissingFields | AuthError::InvalidEmail(_) | AuthError::BlankName) => {
                StatusCode::BAD_REQUEST
            }
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::UserAlreadyExists)
            | Self::Database(RepositoryError::Conflict(_))
            | Self::Order(
                OrderError::EmptyCart
                | OrderError::InsufficientStock { .. }
                | OrderError::InvalidTransition { .. }
                | OrderError::TotalOverflow,
            ) => StatusCode::CONFLICT,
            Self::Database(_)
            | Self::Auth(_)
            | Self::Order(OrderError::Repository(_))
            | Self::Session(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        ErrorPage::for_status(status).render(PageContext::default())
    }
}

/// Set the Sentry user context after login.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tienda_core::OrderStatus;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_error_response_carries_page() {
        let response = AppError::Forbidden.into_response();
        let page = response.extensions().get::<ErrorPage>().copied().unwrap();
        assert_eq!(page.status, StatusCode::FORBIDDEN);
        assert_eq!(page.title, "Acceso denegado");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(status_of(AppError::NotFound("x".to_string())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AppError::BadRequest("x".to_string())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(AppError::Order(OrderError::NotFound)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AppError::Order(OrderError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Paid,
            })),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let response = AppError::Internal("connection refused at 10.0.0.5".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("text/html; charset=utf-8")
        );
    }
}
