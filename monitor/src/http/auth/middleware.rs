//! Authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse as _, Response},
};

use super::{Authorizer as _, CallerContext, LayerState};

/// Middleware that enforces authentication depending on configured mode.
///
/// Unauthorized callers get a bare 401; the protected handlers are never invoked.
/// Sessions past half their lifetime are re-issued on the way out.
pub(crate) async fn require(
    State(LayerState { auth }): State<LayerState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let renewal = {
        let caller = CallerContext::new(req.headers());
        if !auth.is_authorized(&caller) {
            tracing::debug!(uri = %req.uri(), "require: rejecting unauthenticated request");
            return StatusCode::UNAUTHORIZED.into_response();
        }
        auth.renewed_session(&caller)
    };

    let response = next.run(req).await;
    match renewal {
        Some(jar) => (jar, response).into_response(),
        None => response,
    }
}

/// Determine whether the incoming request should be considered secure.
///
/// The monitor itself only speaks plain HTTP, so this relies on the common
/// proxy headers: X-Forwarded-Proto, Forwarded and X-Forwarded-SSL.
pub(crate) fn request_is_secure(headers: &HeaderMap) -> bool {
    if let Some(p) = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        && p.eq_ignore_ascii_case("https")
    {
        return true;
    }
    if let Some(fwd) = headers.get("forwarded").and_then(|v| v.to_str().ok())
        && fwd.to_lowercase().contains("proto=https")
    {
        return true;
    }
    if let Some(x) = headers.get("x-forwarded-ssl").and_then(|v| v.to_str().ok())
        && x.eq_ignore_ascii_case("on")
    {
        return true;
    }
    false
}
