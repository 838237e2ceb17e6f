//! Current-user resolution and authentication extractors.
//!
//! Only the user id is stored in the session. [`resolve_current_user`] loads
//! the row on every request and attaches a [`CurrentUser`] to the request
//! extensions; the extractors below read it from there.

use axum::{
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{Method, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::warn;

use tienda_core::UserId;

use crate::db::UserRepository;
use crate::error::{AppError, ErrorPage, clear_sentry_user, set_sentry_user};
use crate::middleware::PageContext;
use crate::models::{CurrentUser, User, session_keys};
use crate::state::AppState;

/// Resolve the session's user id into a [`CurrentUser`].
///
/// Ids of users that no longer exist are dropped from the session. Error
/// pages coming back from the handler are rendered again with the resolved
/// user, so a logged-in visitor keeps their navigation on a 403 or 404.
pub async fn resolve_current_user(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let user_id = match session.get::<UserId>(session_keys::USER_ID).await {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "Failed to read session; treating request as anonymous");
            None
        }
    };

    let mut current = None;
    if let Some(user_id) = user_id {
        match UserRepository::new(state.pool()).get_by_id(user_id).await {
            Ok(Some(user)) => {
                let user = CurrentUser::from(user);
                request.extensions_mut().insert(user.clone());
                current = Some(user);
            }
            Ok(None) => {
                warn!(user_id = %user_id, "Session refers to a missing user; clearing it");
                if let Err(e) = session.remove::<UserId>(session_keys::USER_ID).await {
                    return AppError::Session(e).into_response();
                }
            }
            Err(e) => return AppError::Database(e).into_response(),
        }
    }

    let response = next.run(request).await;

    match response.extensions().get::<ErrorPage>().copied() {
        Some(error) => error.render(PageContext {
            user: current,
            flashes: Vec::new(),
            currency: state.config().currency,
        }),
        None => response,
    }
}

/// Start an authenticated session for `user`.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn login_user(session: &Session, user: &User) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::USER_ID, user.id).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Remove the identity from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn logout_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<UserId>(session_keys::USER_ID).await?;
    session.cycle_id().await?;
    clear_sentry_user();
    Ok(())
}

/// Rejection for the authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    /// Not logged in; carries the page to return to after login.
    RedirectToLogin(Option<String>),
    /// Logged in but not an administrator.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(Some(next)) => Redirect::to(&login_url(&next)).into_response(),
            Self::RedirectToLogin(None) => Redirect::to("/auth/login").into_response(),
            Self::Forbidden => AppError::Forbidden.into_response(),
        }
    }
}

/// `/auth/login?next=<path>` with the path form-encoded.
#[must_use]
pub fn login_url(next: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("/auth/login?next={encoded}")
}

/// The full path and query of a `GET` request, including any nest prefix.
///
/// Form posts have no page to come back to.
fn return_path(parts: &Parts) -> Option<String> {
    if parts.method != Method::GET {
        return None;
    }
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0);
    uri.path_and_query().map(|pq| pq.as_str().to_owned())
}

/// Extractor that requires a logged-in user.
///
/// Anonymous requests are redirected to the login page with `next` set.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hola, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(Self)
            .ok_or_else(|| AuthRejection::RedirectToLogin(return_path(parts)))
    }
}

/// Extractor that requires an administrator.
///
/// Anonymous requests are redirected to login; customers get `403`.
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if user.is_admin() {
            Ok(Self(user))
        } else {
            warn!(user_id = %user.id, path = %parts.uri.path(), "Non-admin denied admin access");
            Err(AuthRejection::Forbidden)
        }
    }
}

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<CurrentUser>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_encodes_next() {
        assert_eq!(login_url("/cart"), "/auth/login?next=%2Fcart");
        assert_eq!(
            login_url("/?q=runner pro&category=1"),
            "/auth/login?next=%2F%3Fq%3Drunner+pro%26category%3D1"
        );
    }
}
