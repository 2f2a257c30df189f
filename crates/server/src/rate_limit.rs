//! Per-request rate limiting hook. Currently admits everything.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::trace;

pub async fn rate_limit(request: Request, next: Next) -> Response {
    trace!("rate limit: admit {} {}", request.method(), request.uri().path());
    next.run(request).await
}
