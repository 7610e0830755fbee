//! Session lifecycle
//!
//! A session is `Editable` until a submission has been rendered and delivered to the
//! facility, then `Locked` until it is reset. Every mutation checks the phase first,
//! so a rejected call never changes anything.

use serde::Serialize;
use validator::Validate;

use crate::error::AppError;
use crate::models::{
    is_allowed_extension, FieldUpdate, RenderedDocument, TransferRequest, UploadedFile,
    ALLOWED_UPLOAD_EXTENSIONS, MAX_DOB_ENTRIES,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Editable,
    Locked,
}

/// The request and attachments exactly as they were when a preview was generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSnapshot {
    pub request: TransferRequest,
    pub attachments: Vec<UploadedFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    phase: SessionPhase,
    request: TransferRequest,
    attachments: Vec<UploadedFile>,
    last_document: Option<RenderedDocument>,
    last_snapshot: Option<RequestSnapshot>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_locked(&self) -> bool {
        self.phase == SessionPhase::Locked
    }

    pub fn request(&self) -> &TransferRequest {
        &self.request
    }

    pub fn attachments(&self) -> &[UploadedFile] {
        &self.attachments
    }

    pub fn last_document(&self) -> Option<&RenderedDocument> {
        self.last_document.as_ref()
    }

    pub fn has_pending_preview(&self) -> bool {
        self.last_snapshot.is_some()
    }

    fn ensure_editable(&self) -> Result<(), AppError> {
        if self.is_locked() {
            return Err(AppError::SessionLocked);
        }
        Ok(())
    }

    /// Apply field edits. Invalidates any earlier preview.
    pub fn update_fields(&mut self, update: FieldUpdate) -> Result<(), AppError> {
        self.ensure_editable()?;
        update.apply_to(&mut self.request)?;
        self.last_snapshot = None;
        Ok(())
    }

    /// Add an empty DOB slot and return the new slot count.
    pub fn add_dob_slot(&mut self) -> Result<usize, AppError> {
        self.ensure_editable()?;
        if !self.request.dob_entries.add_slot() {
            return Err(AppError::InvalidInput(format!(
                "At most {} DOB entries are allowed",
                MAX_DOB_ENTRIES
            )));
        }
        self.last_snapshot = None;
        Ok(self.request.dob_entries.len())
    }

    /// Append uploads. The whole batch is rejected if any file has a disallowed type.
    pub fn add_attachments(&mut self, files: Vec<UploadedFile>) -> Result<(), AppError> {
        self.ensure_editable()?;
        if let Some(file) = files.iter().find(|f| !is_allowed_extension(f.name())) {
            return Err(AppError::UnsupportedAttachment(format!(
                "{} is not one of: {}",
                file.name(),
                ALLOWED_UPLOAD_EXTENSIONS.join(", ")
            )));
        }
        self.attachments.extend(files);
        self.last_snapshot = None;
        Ok(())
    }

    pub fn clear_attachments(&mut self) -> Result<(), AppError> {
        self.ensure_editable()?;
        self.attachments.clear();
        self.last_snapshot = None;
        Ok(())
    }

    /// Validated copy of the current request and attachments, ready to render.
    pub fn snapshot(&self) -> Result<RequestSnapshot, AppError> {
        self.ensure_editable()?;
        self.request.validate()?;
        Ok(RequestSnapshot {
            request: self.request.clone(),
            attachments: self.attachments.clone(),
        })
    }

    /// Remember a rendered preview and the snapshot it was built from.
    pub fn record_preview(
        &mut self,
        snapshot: RequestSnapshot,
        document: RenderedDocument,
    ) -> Result<(), AppError> {
        self.ensure_editable()?;
        self.last_snapshot = Some(snapshot);
        self.last_document = Some(document);
        Ok(())
    }

    /// The snapshot a submission will send.
    pub fn pending_submission(&self) -> Result<RequestSnapshot, AppError> {
        self.ensure_editable()?;
        self.last_snapshot.clone().ok_or_else(|| {
            AppError::NothingToSubmit(
                "Generate a PDF preview of the current fields before submitting".to_string(),
            )
        })
    }

    /// Editable -> Locked, once the facility notification has been delivered.
    pub fn mark_submitted(&mut self, document: RenderedDocument) -> Result<(), AppError> {
        self.ensure_editable()?;
        self.last_document = Some(document);
        self.phase = SessionPhase::Locked;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
