//! Error types module
//!
//! All request-level failures are unified under `AppError`. Each variant
//! self-describes how it is presented to the client through `ErrorMetadata`.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a refused submission
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "SESSION_LOCKED")
    fn error_code(&self) -> &'static str;

    /// Whether the same action may succeed if repeated
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported attachment: {0}")]
    UnsupportedAttachment(String),

    #[error("Session is locked: the request has already been submitted")]
    SessionLocked,

    #[error("Nothing to submit: {0}")]
    NothingToSubmit(String),

    #[error("Document rendering failed: {0}")]
    Rendering(String),

    #[error("E-mail delivery failed: {cause}")]
    Delivery {
        cause: String,
        fallback_contact: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check the form fields and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Start a new session or generate a preview first"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Enter a valid access key to continue"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce the attachment size"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedAttachment(_) => (
            415,
            "UNSUPPORTED_ATTACHMENT",
            false,
            Some("Attach pdf, docx or xlsx files only"),
            false,
            LogLevel::Debug,
        ),
        AppError::SessionLocked => (
            409,
            "SESSION_LOCKED",
            false,
            Some("Start a new submission to make further changes"),
            false,
            LogLevel::Debug,
        ),
        AppError::NothingToSubmit(_) => (
            409,
            "NOTHING_TO_SUBMIT",
            false,
            Some("Generate a PDF preview before submitting"),
            false,
            LogLevel::Debug,
        ),
        AppError::Rendering(_) => (
            500,
            "RENDERING_ERROR",
            false,
            Some("Contact the facility if this error persists"),
            true,
            LogLevel::Error,
        ),
        AppError::Delivery { .. } => (
            502,
            "DELIVERY_FAILED",
            true,
            Some("Submit again, or contact the facility directly"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::UnsupportedAttachment(_) => "UnsupportedAttachment",
            AppError::SessionLocked => "SessionLocked",
            AppError::NothingToSubmit(_) => "NothingToSubmit",
            AppError::Rendering(_) => "Rendering",
            AppError::Delivery { .. } => "Delivery",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::UnsupportedAttachment(ref msg) => msg.clone(),
            AppError::SessionLocked => {
                "This request is complete. Start a new submission to make changes.".to_string()
            }
            AppError::NothingToSubmit(ref msg) => msg.clone(),
            AppError::Rendering(_) => "Failed to generate the PDF document".to_string(),
            AppError::Delivery {
                cause,
                fallback_contact,
            } => format!(
                "An error occurred while sending emails - please contact {}: {}",
                fallback_contact, cause
            ),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_session_locked() {
        let err = AppError::SessionLocked;
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "SESSION_LOCKED");
        assert!(!err.is_recoverable());
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_delivery_message_carries_cause_and_contact() {
        let err = AppError::Delivery {
            cause: "535 authentication failed".to_string(),
            fallback_contact: "ccm@example.org".to_string(),
        };
        assert_eq!(err.http_status_code(), 502);
        assert!(err.is_recoverable());
        let message = err.client_message();
        assert!(message.contains("ccm@example.org"));
        assert!(message.contains("535 authentication failed"));
    }

    #[test]
    fn test_rendering_error_hides_details() {
        let err = AppError::Rendering("disk full".to_string());
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("disk full"));
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::from(anyhow::anyhow!("inner").context("outer"));
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("outer"));
    }

    #[test]
    fn test_error_metadata_suggested_actions() {
        let err = AppError::NothingToSubmit("no preview".to_string());
        assert_eq!(
            err.suggested_action(),
            Some("Generate a PDF preview before submitting")
        );

        let err = AppError::Unauthorized("bad key".to_string());
        assert_eq!(
            err.suggested_action(),
            Some("Enter a valid access key to continue")
        );
    }
}
