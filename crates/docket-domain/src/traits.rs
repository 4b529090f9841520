//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the pipeline and the outside
//! world. Implementations live in `docket-llm` and `docket-store`.

use crate::{AdapterError, FileRef, StoreError};
use async_trait::async_trait;

/// A downloaded file ready to be sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Display name (final path segment)
    pub file_name: String,
    /// MIME type derived from the extension
    pub mime_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl Document {
    /// Build a document, guessing the MIME type from the file name
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_for(&file_name).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Generative document-understanding service
///
/// Implementations only move bytes and text. Parsing, label matching and
/// retries are the caller's job. Every method suspends on network I/O.
#[async_trait]
pub trait ExtractionAdapter: Send + Sync {
    /// Ask which category the document belongs to; returns the raw answer
    async fn classify(&self, document: &Document, prompt: &str) -> Result<String, AdapterError>;

    /// Run a field-extraction prompt against the document
    async fn extract(&self, document: &Document, field_prompt: &str)
        -> Result<String, AdapterError>;

    /// Run a text-only prompt
    async fn prompt_only(&self, prompt: &str) -> Result<String, AdapterError>;
}

/// Object storage holding a batch's files
///
/// Not-found and forbidden errors concern a single object; callers treat
/// them as fatal to that file only.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every object in the container, at any depth
    async fn list_files(&self, container: &str) -> Result<Vec<FileRef>, StoreError>;

    /// Fetch an object's bytes
    async fn download(&self, file: &FileRef) -> Result<Vec<u8>, StoreError>;

    /// Write an object, replacing any existing one
    async fn upload(
        &self,
        container: &str,
        path: &str,
        bytes: Vec<u8>,
    ) -> Result<FileRef, StoreError>;

    /// Remove an object
    async fn delete(&self, file: &FileRef) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_guess() {
        assert_eq!(Document::new("a.PDF", vec![]).mime_type, "application/pdf");
        assert_eq!(Document::new("b.jpeg", vec![]).mime_type, "image/jpeg");
        assert_eq!(Document::new("c", vec![]).mime_type, "application/octet-stream");
    }
}
