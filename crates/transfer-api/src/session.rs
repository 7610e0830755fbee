//! Session cookie handling and the `SessionHandle` extractor.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use std::sync::Arc;
use tokio::sync::MutexGuard;
use transfer_core::{AppError, SessionState};
use uuid::Uuid;

use crate::constants::SESSION_COOKIE;
use crate::error::HttpAppError;
use crate::state::{AppState, SharedSession};

/// Session id from the `Cookie` header, if present and well-formed.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    let prefix = format!("{}=", SESSION_COOKIE);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|part| part.trim().strip_prefix(prefix.as_str()))
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value for a new session.
pub fn session_cookie(id: Uuid, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; Path=/; SameSite=Strict; HttpOnly{}",
        SESSION_COOKIE, id, secure_flag
    )
}

/// The caller's session, resolved from the session cookie.
pub struct SessionHandle {
    id: Uuid,
    session: SharedSession,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for any in-flight action on this session, then take exclusive access.
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.session.lock().await
    }
}

impl FromRequestParts<Arc<AppState>> for SessionHandle {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let missing = || {
            HttpAppError(AppError::NotFound(
                "No active session. Start a new session first.".to_string(),
            ))
        };
        let id = session_id_from_headers(&parts.headers).ok_or_else(missing)?;
        let session = state.sessions.get(id).await.ok_or_else(missing)?;
        Ok(Self { id, session })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_id_parsed_among_other_cookies() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}; other=1", SESSION_COOKIE, id))
                .expect("header"),
        );
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn test_malformed_session_id_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("transfer-session=not-a-uuid"),
        );
        assert_eq!(session_id_from_headers(&headers), None);
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_cookie_flags() {
        let id = Uuid::nil();
        let cookie = session_cookie(id, true);
        assert!(cookie.starts_with("transfer-session=00000000-0000-0000-0000-000000000000;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("; Secure"));
        assert!(!session_cookie(id, false).contains("Secure"));
    }
}
