use axum::http::HeaderValue;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Security headers configuration
#[derive(Clone)]
pub struct SecurityHeadersConfig {
    pub is_production: bool,
}

impl SecurityHeadersConfig {
    pub fn new(is_production: bool) -> Self {
        Self { is_production }
    }
}

const CSP: &str = "default-src 'none'; img-src 'self' data:; frame-ancestors 'none'";

/// Adds security headers to all HTTP responses
pub async fn security_headers_middleware(
    State(config): State<Arc<SecurityHeadersConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    // HSTS only in production, where the service sits behind HTTPS
    if config.is_production {
        headers.insert(
            "Strict-Transport-Security",
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    headers.insert("Content-Security-Policy", HeaderValue::from_static(CSP));
    headers.insert(
        "Permissions-Policy",
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );

    // Session views and documents are per-user
    headers.insert(
        "Cache-Control",
        HeaderValue::from_static("no-store, private"),
    );

    response
}
