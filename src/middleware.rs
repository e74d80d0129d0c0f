use crate::http_handler::AppError;
use crate::origin_validation::{OriginDecision, OriginPolicy};
use axum::{
    body::Body,
    extract::State,
    http::{Request as HttpRequest, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Axum middleware enforcing the configured origin policy.
///
/// A denied origin is answered here; the request never reaches a route handler,
/// so nothing is parsed or signed for it.
pub async fn origin_guard_middleware(
    State(policy): State<Arc<OriginPolicy>>,
    request: HttpRequest<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let origin = match request.headers().get(header::ORIGIN) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| {
            tracing::warn!("Rejecting request with a non-ASCII Origin header");
            AppError::OriginNotAllowed("Origin header is not valid".to_string())
        })?),
    };

    match policy.evaluate(origin) {
        OriginDecision::Allow => Ok(next.run(request).await),
        OriginDecision::Deny(reason) => {
            tracing::warn!(
                path = %request.uri().path(),
                "Origin rejected: {}",
                reason
            );
            Err(AppError::OriginNotAllowed(reason))
        }
    }
}
