//! Route configuration and setup

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::middleware::{
    access_key_middleware, security_headers_middleware, SecurityHeadersConfig,
};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use transfer_core::Config;

use crate::constants::ACCESS_KEY_HEADER;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router<()> {
    // Public routes (no access key required)
    let public_routes = Router::new().route("/health", get(handlers::health::health_check));

    // Protected routes (require X-Access-Key)
    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        access_key_middleware,
    ));

    let security_headers_config = Arc::new(SecurityHeadersConfig::new(config.is_production()));

    public_routes
        .merge(protected_routes)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_size_bytes()))
        .layer(setup_cors())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ))
        .with_state(state)
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/sessions", API_PREFIX),
            post(handlers::session::create_session),
        )
        .route(
            &format!("{}/session", API_PREFIX),
            get(handlers::session::get_session),
        )
        .route(
            &format!("{}/session/request", API_PREFIX),
            patch(handlers::fields::update_request),
        )
        .route(
            &format!("{}/session/dob", API_PREFIX),
            post(handlers::fields::add_dob),
        )
        .route(
            &format!("{}/session/attachments", API_PREFIX),
            post(handlers::attachments::upload_attachments)
                .delete(handlers::attachments::clear_attachments),
        )
        .route(
            &format!("{}/session/preview", API_PREFIX),
            post(handlers::preview::preview_document),
        )
        .route(
            &format!("{}/session/document", API_PREFIX),
            get(handlers::document::download_document),
        )
        .route(
            &format!("{}/session/submit", API_PREFIX),
            post(handlers::submit::submit_request),
        )
        .route(
            &format!("{}/session/reset", API_PREFIX),
            post(handlers::session::reset_session),
        )
}

/// Setup CORS configuration
fn setup_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(ACCESS_KEY_HEADER),
        ])
}
