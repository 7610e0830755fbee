use axum::{extract::Multipart, Json};
use transfer_core::{AppError, UploadedFile};

use super::session::SessionView;
use crate::constants::UPLOAD_FIELD;
use crate::error::HttpAppError;
use crate::session::SessionHandle;

/// Accepts one or more `files` parts. Each payload is buffered once here, so later
/// previews and submissions never re-read the request stream.
#[tracing::instrument(skip(handle, multipart), fields(session_id = %handle.id()))]
pub async fn upload_attachments(
    handle: SessionHandle,
    mut multipart: Multipart,
) -> Result<Json<SessionView>, HttpAppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != UPLOAD_FIELD && field_name != "file" {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("Uploaded file has no filename".to_string()))?;
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?;

        tracing::debug!(file = %filename, size = data.len(), "Attachment received");
        files.push(UploadedFile::new(filename, content_type, data));
    }

    if files.is_empty() {
        return Err(AppError::BadRequest(format!(
            "No files provided in the '{}' field",
            UPLOAD_FIELD
        ))
        .into());
    }

    let mut session = handle.lock().await;
    let count = files.len();
    session.add_attachments(files)?;
    tracing::info!(count = count, total = session.attachments().len(), "Attachments added");

    Ok(Json(SessionView::new(handle.id(), &session)))
}

#[tracing::instrument(skip(handle), fields(session_id = %handle.id()))]
pub async fn clear_attachments(handle: SessionHandle) -> Result<Json<SessionView>, HttpAppError> {
    let mut session = handle.lock().await;
    session.clear_attachments()?;
    Ok(Json(SessionView::new(handle.id(), &session)))
}
