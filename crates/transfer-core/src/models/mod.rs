//! Domain models

pub mod document;
pub mod request;
pub mod upload;

pub use document::{DocumentSummary, RenderedDocument};
pub use request::{
    AttachmentChecklist, ChecklistUpdate, DobEntries, FieldUpdate, HumaneEndpointSpec,
    HumaneEndpointUpdate, Sex, TransferRequest, TumourRecord, TumourUpdate, MAX_DOB_ENTRIES,
};
pub use upload::{is_allowed_extension, UploadSummary, UploadedFile, ALLOWED_UPLOAD_EXTENSIONS};
