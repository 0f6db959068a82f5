//! Middleware applied to every request.
//!
//! Outermost first: panic recovery, access logging, security headers.
//! The static file mount has its own redirect fixup.

use std::any::Any;
use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request};
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::status_response;

/// Mount point of the static file service.
pub const STATIC_PREFIX: &str = "/static";

const CONTENT_SECURITY_POLICY: &str =
    "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com";

/// Static headers set on every response.
pub static SECURITY_HEADERS: [(HeaderName, &str); 5] = [
    (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
    (header::REFERRER_POLICY, "origin-when-cross-origin"),
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "deny"),
    (header::X_XSS_PROTECTION, "0"),
];

fn apply_security_headers(headers: &mut HeaderMap) {
    for (name, value) in &SECURITY_HEADERS {
        headers.insert(name.clone(), HeaderValue::from_static(*value));
    }
}

/// Add the security headers to a response.
pub async fn secure_headers(mut response: Response) -> Response {
    apply_security_headers(response.headers_mut());
    response
}

/// Prefix absolute redirect targets issued inside the static mount with
/// [`STATIC_PREFIX`].
pub async fn remount_redirect(mut response: Response) -> Response {
    if !response.status().is_redirection() {
        return response;
    }
    let remounted = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .filter(|location| location.starts_with('/'))
        .and_then(|location| HeaderValue::from_str(&format!("{STATIC_PREFIX}{location}")).ok());
    if let Some(location) = remounted {
        response.headers_mut().insert(header::LOCATION, location);
    }
    response
}

/// Access log. The request line is written before the handler runs so a
/// request that panics is still logged; completion is logged separately.
pub async fn log_request(req: Request, next: Next) -> Response {
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let method = req.method().clone();
    let uri = req.uri().clone();
    tracing::info!(
        remote = %remote,
        proto = ?req.version(),
        method = %method,
        uri = %uri,
        "request"
    );
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::debug!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "response"
    );

    response
}

/// `CatchPanicLayer` handler: log the payload, answer 500, close the connection.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else {
        "non-string panic payload"
    };
    tracing::error!(panic = %detail, "handler panicked");

    let mut response = status_response(StatusCode::INTERNAL_SERVER_ERROR);
    let headers = response.headers_mut();
    headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
    apply_security_headers(headers);
    response
}
