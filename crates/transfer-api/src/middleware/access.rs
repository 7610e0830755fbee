//! Shared access-key gate for the session API.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use transfer_core::AppError;

use crate::constants::ACCESS_KEY_HEADER;
use crate::error::HttpAppError;
use crate::state::AppState;

/// Reject requests whose `X-Access-Key` is missing or not on the allow-list.
/// Keys are compared trimmed and case-insensitively.
pub async fn access_key_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let rejection = match request
        .headers()
        .get(ACCESS_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
    {
        Some(key) if state.config.access_keys().is_allowed(key) => None,
        Some(_) => Some("Access key not recognized"),
        None => Some("Missing X-Access-Key header"),
    };

    match rejection {
        None => next.run(request).await,
        Some(reason) => {
            tracing::warn!(path = %request.uri().path(), reason = reason, "Access denied");
            HttpAppError(AppError::Unauthorized(reason.to_string())).into_response()
        }
    }
}
