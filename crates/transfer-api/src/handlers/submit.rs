use axum::{extract::State, Json};
use std::sync::Arc;

use crate::error::HttpAppError;
use crate::services::submission::{self, SubmissionOutcome};
use crate::session::SessionHandle;
use crate::state::AppState;

/// The session lock is held for the whole render and send, so a second submit waits
/// and then sees the locked session.
#[tracing::instrument(skip(state, handle), fields(session_id = %handle.id()))]
pub async fn submit_request(
    State(state): State<Arc<AppState>>,
    handle: SessionHandle,
) -> Result<Json<SubmissionOutcome>, HttpAppError> {
    let mut session = handle.lock().await;
    let outcome = submission::submit(&state, handle.id(), &mut session).await?;
    Ok(Json(outcome))
}
