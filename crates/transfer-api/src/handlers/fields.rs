use axum::Json;
use transfer_core::FieldUpdate;

use super::session::SessionView;
use crate::error::{HttpAppError, ValidatedJson};
use crate::session::SessionHandle;

#[tracing::instrument(skip(handle, update), fields(session_id = %handle.id()))]
pub async fn update_request(
    handle: SessionHandle,
    ValidatedJson(update): ValidatedJson<FieldUpdate>,
) -> Result<Json<SessionView>, HttpAppError> {
    let mut session = handle.lock().await;
    session.update_fields(update)?;
    Ok(Json(SessionView::new(handle.id(), &session)))
}

#[tracing::instrument(skip(handle), fields(session_id = %handle.id()))]
pub async fn add_dob(handle: SessionHandle) -> Result<Json<SessionView>, HttpAppError> {
    let mut session = handle.lock().await;
    let slots = session.add_dob_slot()?;
    tracing::debug!(slots = slots, "DOB slot added");
    Ok(Json(SessionView::new(handle.id(), &session)))
}
