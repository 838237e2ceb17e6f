//! Request ID middleware for request tracing and correlation.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request id we accept verbatim.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// Ensure every request carries an id.
///
/// An upstream `x-request-id` is reused when it is short, visible ASCII;
/// otherwise a UUID v4 is generated. The id is recorded on the current span,
/// tagged on the Sentry scope and echoed in the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| is_acceptable_id(id))
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", request_id.as_str());

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn is_acceptable_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_UPSTREAM_ID_LEN && id.bytes().all(|b| b.is_ascii_graphic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptable_ids() {
        assert!(is_acceptable_id("abc-123"));
        assert!(is_acceptable_id(&Uuid::new_v4().to_string()));
        assert!(!is_acceptable_id(""));
        assert!(!is_acceptable_id("has space"));
        assert!(!is_acceptable_id(&"x".repeat(MAX_UPSTREAM_ID_LEN + 1)));
    }
}
