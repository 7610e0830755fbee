use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use transfer_core::models::DocumentSummary;

use crate::error::HttpAppError;
use crate::services::submission;
use crate::session::SessionHandle;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub document: DocumentSummary,
    pub download_url: String,
}

#[tracing::instrument(skip(state, handle), fields(session_id = %handle.id()))]
pub async fn preview_document(
    State(state): State<Arc<AppState>>,
    handle: SessionHandle,
) -> Result<Json<PreviewResponse>, HttpAppError> {
    let mut session = handle.lock().await;
    let document = submission::preview(&state, handle.id(), &mut session).await?;

    Ok(Json(PreviewResponse {
        document: document.summary(),
        download_url: format!("{}/session/document", crate::constants::API_PREFIX),
    }))
}
