//! Preview and submission of a session's request.
//!
//! Both paths render from an immutable snapshot. Submission delivers the facility
//! notification first and only then locks the session; the optional receipt is
//! attempted afterwards and can only add a warning.

use chrono::Local;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use transfer_core::models::DocumentSummary;
use transfer_core::naming::{base_name_for, document_file_name, receipt_file_name, receipt_subject};
use transfer_core::{
    AppError, DocumentSections, RenderedDocument, RequestSnapshot, SessionState, UploadedFile,
};
use transfer_services::{HtmlBody, Notification};
use uuid::Uuid;

use crate::state::AppState;

pub const RECEIPT_FAILED: &str = "RECEIPT_FAILED";
pub const MONITORING_SHEETS_MISSING: &str = "MONITORING_SHEETS_MISSING";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionWarning {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub document: DocumentSummary,
    pub receipt_sent: bool,
    pub warnings: Vec<SubmissionWarning>,
}

/// `dir/file_name`, refusing any name that is not a single plain path component.
fn session_file(dir: &Path, file_name: &str) -> Result<PathBuf, AppError> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(dir.join(file_name)),
        _ => Err(AppError::InvalidInput(format!(
            "'{}' is not a valid document name",
            file_name
        ))),
    }
}

/// Render off the async runtime; layout and compression are CPU bound.
async fn render_document(
    state: &AppState,
    sections: DocumentSections,
    attachments: Vec<UploadedFile>,
    path: PathBuf,
) -> Result<RenderedDocument, AppError> {
    let renderer = state.renderer.clone();
    let document = tokio::task::spawn_blocking(move || {
        renderer.render(&sections, &attachments, &path)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Render task failed: {}", e)))??;
    Ok(document)
}

/// Validate the current fields, render them and remember the snapshot for submit.
pub async fn preview(
    state: &AppState,
    session_id: Uuid,
    session: &mut SessionState,
) -> Result<RenderedDocument, AppError> {
    let snapshot = session.snapshot()?;
    let base = base_name_for(&snapshot.request)?;
    let sections = DocumentSections::from_request(&snapshot.request);
    let dir = state.sessions.session_dir(session_id);
    let path = session_file(&dir, &document_file_name(&base))?;

    let document =
        render_document(state, sections, snapshot.attachments.clone(), path).await?;

    tracing::info!(
        session_id = %session_id,
        file = %document.file_name(),
        pages = document.page_count(),
        "Preview generated"
    );

    session.record_preview(snapshot, document.clone())?;
    Ok(document)
}

fn monitoring_sheets_attached(attachments: &[UploadedFile]) -> bool {
    attachments
        .iter()
        .any(|f| f.name().to_lowercase().contains("monitor"))
}

fn monitoring_advisory(facility_email: &str) -> SubmissionWarning {
    SubmissionWarning {
        code: MONITORING_SHEETS_MISSING,
        message: format!(
            "Monitoring sheets were not attached. Please send them to the Facility Manager at {} \
             at least 24 hours before the transfer, and no later than the time the animals arrive at CCM.",
            facility_email
        ),
    }
}

/// Receipt copy for the requester: its own document, sent without CC.
#[allow(clippy::too_many_arguments)]
async fn send_receipt(
    state: &AppState,
    recipient: &str,
    base: &str,
    sections: DocumentSections,
    attachments: Vec<UploadedFile>,
    html_body: String,
    dir: &Path,
) -> Result<(), AppError> {
    let path = session_file(dir, &receipt_file_name(base))?;
    let receipt = render_document(state, sections, attachments.clone(), path).await?;
    state
        .dispatcher
        .send(Notification {
            recipient: recipient.to_string(),
            subject: receipt_subject(base),
            html_body,
            document_path: receipt.path().to_path_buf(),
            attachments,
            cc: None,
        })
        .await
        .map_err(|e| e.into_app_error(state.config.facility_email()))
}

/// Render and deliver the previewed snapshot, then lock the session.
///
/// A facility delivery failure leaves the session editable and skips the receipt.
pub async fn submit(
    state: &AppState,
    session_id: Uuid,
    session: &mut SessionState,
) -> Result<SubmissionOutcome, AppError> {
    let RequestSnapshot {
        request,
        attachments,
    } = session.pending_submission()?;
    let base = base_name_for(&request)?;
    let sections = DocumentSections::from_request(&request);
    let dir = state.sessions.session_dir(session_id);
    let facility_email = state.config.facility_email();
    let receipt_recipient = request.receipt_recipient().map(str::to_string);

    let document = render_document(
        state,
        sections.clone(),
        attachments.clone(),
        session_file(&dir, &document_file_name(&base))?,
    )
    .await?;

    let html_body = HtmlBody {
        sections: &sections,
        attachments: &attachments,
        submitted_on: Local::now().date_naive(),
        copy_sent: receipt_recipient.is_some(),
        logo: state.email_logo.as_ref(),
    }
    .render();

    state
        .dispatcher
        .send(Notification {
            recipient: facility_email.to_string(),
            subject: base.clone(),
            html_body: html_body.clone(),
            document_path: document.path().to_path_buf(),
            attachments: attachments.clone(),
            cc: receipt_recipient.clone(),
        })
        .await
        .map_err(|e| {
            tracing::warn!(session_id = %session_id, error = %e, "Facility notification failed");
            e.into_app_error(facility_email)
        })?;

    session.mark_submitted(document.clone())?;
    tracing::info!(
        session_id = %session_id,
        subject = %base,
        attachments = attachments.len(),
        "Transfer request submitted"
    );

    let mut warnings = Vec::new();
    let mut receipt_sent = false;

    if let Some(recipient) = receipt_recipient {
        let receipt = send_receipt(
            state,
            &recipient,
            &base,
            sections,
            attachments.clone(),
            html_body,
            &dir,
        );
        match receipt.await {
            Ok(()) => receipt_sent = true,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Receipt delivery failed");
                warnings.push(SubmissionWarning {
                    code: RECEIPT_FAILED,
                    message: format!(
                        "Your request was submitted, but the copy to {} could not be sent: {}",
                        recipient, e
                    ),
                });
            }
        }
    }

    if !monitoring_sheets_attached(&attachments) {
        warnings.push(monitoring_advisory(facility_email));
    }

    Ok(SubmissionOutcome {
        document: document.summary(),
        receipt_sent,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitoring_detection_is_case_insensitive() {
        let files = vec![UploadedFile::new(
            "Tumour_MONITORING_week3.xlsx",
            "application/octet-stream",
            vec![1],
        )];
        assert!(monitoring_sheets_attached(&files));
        assert!(!monitoring_sheets_attached(&[]));
        assert!(!monitoring_sheets_attached(&[UploadedFile::new(
            "protocol.pdf",
            "application/pdf",
            vec![1]
        )]));
    }

    #[test]
    fn test_session_file_stays_in_session_dir() {
        let dir = Path::new("/srv/out/session");
        assert_eq!(
            session_file(dir, "[TransferToCCM]_5F_X_Y_Z_Nov10.pdf").expect("plain name"),
            dir.join("[TransferToCCM]_5F_X_Y_Z_Nov10.pdf")
        );
        for name in ["../x.pdf", "a/b.pdf", "/tmp/x.pdf", "..", ".", ""] {
            assert!(
                matches!(session_file(dir, name), Err(AppError::InvalidInput(_))),
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_advisory_names_facility() {
        let warning = monitoring_advisory("ccm@example.org");
        assert_eq!(warning.code, MONITORING_SHEETS_MISSING);
        assert!(warning.message.contains("ccm@example.org"));
        assert!(warning.message.contains("24 hours"));
    }
}
