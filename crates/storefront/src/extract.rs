//! Path and form extractors that fail with [`AppError`].
//!
//! axum's own rejections answer in plain text; these wrappers route bad
//! input through the HTML error page instead.

use axum::{
    extract::{
        FromRequest, FromRequestParts, Request,
        rejection::{FormRejection, PathRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Path parameters. A segment that doesn't parse (`/products/abc`) is a 404.
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Path(value)) => Ok(Self(value)),
            Err(PathRejection::FailedToDeserializePathParams(e)) => {
                Err(AppError::NotFound(format!("{}: {}", parts.uri.path(), e.body_text())))
            }
            Err(e) => Err(AppError::Internal(e.body_text())),
        }
    }
}

/// URL-encoded form body. Anything axum can't decode is a 400.
pub struct Form<T>(pub T);

impl<S, T> FromRequest<S> for Form<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Form::<T>::from_request(req, state)
            .await
            .map(|axum::extract::Form(value)| Self(value))
            .map_err(|e: FormRejection| AppError::BadRequest(e.body_text()))
    }
}
