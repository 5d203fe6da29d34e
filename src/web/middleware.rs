//! HTTP middleware

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, Method, Uri},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Request logging middleware
///
/// Runs the request inside a span carrying a fresh request id, logs the
/// outcome with its timing and echoes the id back in `x-request-id`.
pub async fn request_logging_middleware(
    method: Method,
    uri: Uri,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!("http_request", request_id = %request_id);

    debug!(parent: &span, method = %method, uri = %uri, "HTTP request started");
    let mut response = next.run(request).instrument(span.clone()).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;
    span.in_scope(|| {
        if status.is_client_error() || status.is_server_error() {
            warn!(method = %method, uri = %uri, status = status.as_u16(), duration_ms, "HTTP request failed");
        } else {
            info!(method = %method, uri = %uri, status = status.as_u16(), duration_ms, "HTTP request completed");
        }
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
