//! Transfer Core Library
//!
//! This crate provides the domain models, error types, configuration, derived naming
//! and the session lifecycle shared by the rendering, e-mail and HTTP crates.

pub mod access;
pub mod config;
pub mod error;
pub mod models;
pub mod naming;
pub mod sections;
pub mod session;

// Re-export commonly used types
pub use access::AccessList;
pub use config::{Config, PortalConfig, SmtpTlsMode};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AttachmentChecklist, DobEntries, FieldUpdate, HumaneEndpointSpec, RenderedDocument, Sex,
    TransferRequest, TumourRecord, UploadedFile,
};
pub use sections::DocumentSections;
pub use session::{RequestSnapshot, SessionPhase, SessionState};
