//! Request tracing middleware

use std::time::Instant;

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use tracing::Instrument;

/// First hop of `x-forwarded-for`, else `x-real-ip`
fn client_ip(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| headers.get(name).and_then(|h| h.to_str().ok());

    header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .or_else(|| header("x-real-ip"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Wrap each request in a span and log its outcome with timing.
///
/// Only method and path are recorded; query strings and headers may carry
/// credentials and are left out.
pub async fn request_tracing(request: Request, next: Next) -> Response {
    let span = tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        client_ip = ?client_ip(request.headers()),
    );

    let start = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    let duration_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    let _entered = span.enter();
    if response.status().is_server_error() {
        tracing::error!(status, duration_ms, "Request completed with error");
    } else if response.status().is_client_error() {
        tracing::warn!(status, duration_ms, "Request completed with client error");
    } else {
        tracing::info!(status, duration_ms, "Request completed");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.1"));
        assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_client_ip_fallbacks() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), None);

        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.1"));
        assert_eq!(client_ip(&headers).as_deref(), Some("192.168.1.1"));
    }
}
