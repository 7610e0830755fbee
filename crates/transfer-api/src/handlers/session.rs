use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use transfer_core::models::{DocumentSummary, UploadSummary};
use transfer_core::sections::age_summary;
use transfer_core::{SessionPhase, SessionState, TransferRequest};
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::session::{session_cookie, SessionHandle};
use crate::state::AppState;

/// Everything a client needs to redraw the form.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: SessionPhase,
    pub request: TransferRequest,
    pub attachments: Vec<UploadSummary>,
    pub checked_items: Vec<&'static str>,
    pub age_at_transfer: Option<String>,
    pub can_add_dob: bool,
    pub has_preview: bool,
    pub document: Option<DocumentSummary>,
}

impl SessionView {
    pub fn new(session_id: Uuid, state: &SessionState) -> Self {
        let request = state.request();
        Self {
            session_id,
            phase: state.phase(),
            request: request.clone(),
            attachments: state.attachments().iter().map(|f| f.summary()).collect(),
            checked_items: request.checklist.checked_items(),
            age_at_transfer: age_summary(request),
            can_add_dob: !state.is_locked() && request.dob_entries.can_add(),
            has_preview: state.has_pending_preview(),
            document: state.last_document().map(|d| d.summary()),
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (id, session) = state.sessions.create().await;
    let view = SessionView::new(id, &*session.lock().await);
    let cookie = session_cookie(id, state.config.is_production());

    tracing::info!(session_id = %id, "Session started");

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(view),
    ))
}

pub async fn get_session(handle: SessionHandle) -> Result<Json<SessionView>, HttpAppError> {
    let session = handle.lock().await;
    Ok(Json(SessionView::new(handle.id(), &session)))
}

/// Always allowed, also while locked. Documents rendered for the session are removed.
#[tracing::instrument(skip(state, handle), fields(session_id = %handle.id()))]
pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    handle: SessionHandle,
) -> Result<Json<SessionView>, HttpAppError> {
    let mut session = handle.lock().await;
    session.reset();
    state.sessions.discard_documents(handle.id()).await;
    tracing::info!("Session reset");
    Ok(Json(SessionView::new(handle.id(), &session)))
}
