use axum::{
    body::Body,
    http::{header, Response, StatusCode},
    response::IntoResponse,
};
use transfer_core::AppError;

use crate::error::HttpAppError;
use crate::session::SessionHandle;

/// `attachment` disposition with an ASCII `filename` fallback and the exact name as
/// an RFC 5987 `filename*` parameter.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::with_capacity(file_name.len());
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}

/// Download the most recently rendered document of this session.
#[tracing::instrument(skip(handle), fields(session_id = %handle.id()))]
pub async fn download_document(handle: SessionHandle) -> Result<impl IntoResponse, HttpAppError> {
    let document = handle
        .lock()
        .await
        .last_document()
        .cloned()
        .ok_or_else(|| AppError::NotFound("No document has been generated yet".to_string()))?;

    let disposition = content_disposition(document.file_name());

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_DISPOSITION, disposition.as_str())
        .body(Body::from(document.bytes()))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_is_kept_in_both_parameters() {
        assert_eq!(
            content_disposition("[TransferToCCM]_5F_X_Nov10.pdf"),
            "attachment; filename=\"[TransferToCCM]_5F_X_Nov10.pdf\"; \
             filename*=UTF-8''%5BTransferToCCM%5D_5F_X_Nov10.pdf"
        );
    }

    #[test]
    fn test_quotes_and_non_ascii_cannot_break_the_header() {
        let value = content_disposition("Jos\u{e9} \"JD\".pdf");
        assert!(value.starts_with("attachment; filename=\"Jos_ _JD_.pdf\";"));
        assert!(value.ends_with("filename*=UTF-8''Jos%C3%A9%20%22JD%22.pdf"));
        assert!(axum::http::HeaderValue::from_str(&value).is_ok());
    }
}
