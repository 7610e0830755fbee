//! Uploaded attachments
//!
//! Payloads are buffered once when they are collected. Every consumer (the document
//! renderer, the e-mail dispatcher) gets its own `Bytes` view, so nothing is ever read
//! twice from an exhausted stream.

use bytes::Bytes;
use serde::Serialize;

/// Extensions accepted by the attachment uploader.
pub const ALLOWED_UPLOAD_EXTENSIONS: [&str; 3] = ["pdf", "docx", "xlsx"];

pub fn is_allowed_extension(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Text after the last `.`; the whole name when there is no dot.
fn extension_of(filename: &str) -> &str {
    filename.rsplit('.').next().unwrap_or(filename)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    content_type: String,
    data: Bytes,
}

impl UploadedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Lower-cased extension, as used for MIME subtype lookup.
    pub fn extension(&self) -> String {
        extension_of(&self.name).to_lowercase()
    }

    /// An independent read-only view of the payload.
    pub fn data(&self) -> Bytes {
        self.data.clone()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn summary(&self) -> UploadSummary {
        UploadSummary {
            name: self.name.clone(),
            extension: extension_of(&self.name).to_uppercase(),
            size_bytes: self.data.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub name: String,
    pub extension: String,
    pub size_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert!(is_allowed_extension("monitoring.PDF"));
        assert!(is_allowed_extension("cage-map.xlsx"));
        assert!(is_allowed_extension("notes.v2.docx"));
        assert!(!is_allowed_extension("photo.png"));
        assert!(!is_allowed_extension("pdf"));
    }

    #[test]
    fn test_views_are_independent() {
        let file = UploadedFile::new("sheet.pdf", "application/pdf", b"%PDF-1.4".to_vec());
        let first = file.data();
        let second = file.data();
        assert_eq!(first, second);
        assert_eq!(file.size(), 8);
    }

    #[test]
    fn test_summary_upper_cases_extension() {
        let file = UploadedFile::new("Tumour Growth.xlsx", "application/octet-stream", vec![1]);
        let summary = file.summary();
        assert_eq!(summary.extension, "XLSX");
        assert_eq!(file.extension(), "xlsx");
    }
}
