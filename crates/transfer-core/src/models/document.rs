use bytes::Bytes;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A rendered PDF. Produced fresh for every preview or submit and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    file_name: String,
    path: PathBuf,
    bytes: Bytes,
    page_count: usize,
}

impl RenderedDocument {
    pub fn new(
        file_name: impl Into<String>,
        path: impl Into<PathBuf>,
        bytes: impl Into<Bytes>,
        page_count: usize,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            path: path.into(),
            bytes: bytes.into(),
            page_count,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            file_name: self.file_name.clone(),
            size_bytes: self.bytes.len(),
            page_count: self.page_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub file_name: String,
    pub size_bytes: usize,
    pub page_count: usize,
}
