//! Error types for the Orchestrator

use docket_domain::{AdapterError, DocType, DomainError, StoreError};
use docket_extractor::ExtractorError;
use thiserror::Error;

/// Batch-level failures; nothing was processed
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Missing prompt template, invalid settings or credentials
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The source container could not be listed
    #[error("Listing failed: {0}")]
    Listing(#[source] StoreError),
}

/// Why one file ended in `ERROR`
///
/// Rendered into the file's `errorReason`; never propagated to siblings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FileError {
    /// Model service kept failing transiently after every retry
    #[error("Transient service error: {0}")]
    Transient(String),

    /// Model service rejected the request
    #[error("Permanent service error: {0}")]
    Permanent(String),

    /// Download failed (not found, forbidden, I/O)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Classifier could not place the document
    #[error("Invalid format: classified as `{0}`")]
    InvalidFormat(String),

    /// A single-document request was classified as some other type
    #[error("Document was classified as {classified}, not the requested {requested}")]
    TypeMismatch {
        /// Type the caller asked for
        requested: DocType,
        /// Type the classifier returned
        classified: DocType,
    },

    /// Record does not fit any usable shape
    #[error("Structural parse error: {0}")]
    StructuralParse(String),

    /// Truncation repair spent its whole budget
    #[error("Reprocessing exhausted after {attempts} attempts")]
    ReprocessingExhausted {
        /// Continuation requests made
        attempts: u32,
    },

    /// Truncation repair could not find where to resume
    #[error("Reprocessing aborted: {0}")]
    ReprocessingAborted(String),

    /// Response was truncated and the type has no repair profile
    #[error("Truncated response for {0}, which does not support reprocessing")]
    UnsupportedType(DocType),

    /// File exceeds the configured size limit
    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge {
        /// Listed size
        size: u64,
        /// Configured limit
        limit: u64,
    },

    /// The run was cancelled before the file finished
    #[error("Cancelled")]
    Cancelled,

    /// Bug or task panic
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AdapterError> for FileError {
    fn from(e: AdapterError) -> Self {
        match e {
            AdapterError::Transient(m) => FileError::Transient(m),
            AdapterError::Permanent(m) => FileError::Permanent(m),
        }
    }
}

impl From<StoreError> for FileError {
    fn from(e: StoreError) -> Self {
        FileError::Storage(e.to_string())
    }
}

impl From<DomainError> for FileError {
    fn from(e: DomainError) -> Self {
        FileError::Internal(e.to_string())
    }
}

impl From<ExtractorError> for FileError {
    fn from(e: ExtractorError) -> Self {
        match e {
            ExtractorError::Adapter(a) => a.into(),
            ExtractorError::StructuralParse(m) => FileError::StructuralParse(m),
            ExtractorError::ReprocessingExhausted { attempts } => {
                FileError::ReprocessingExhausted { attempts }
            }
            ExtractorError::ReprocessingAborted(m) => FileError::ReprocessingAborted(m),
            ExtractorError::Unsupported(t) => FileError::UnsupportedType(t),
            other => FileError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_errors_keep_their_kind() {
        let e: FileError = ExtractorError::Adapter(AdapterError::Transient("429".into())).into();
        assert_eq!(e, FileError::Transient("429".into()));

        let e = FileError::TypeMismatch {
            requested: DocType::Invoice,
            classified: DocType::Cv,
        };
        assert_eq!(e.to_string(), "Document was classified as CV, not the requested Invoice");

        let e: FileError = ExtractorError::ReprocessingExhausted { attempts: 4 }.into();
        assert_eq!(e.to_string(), "Reprocessing exhausted after 4 attempts");

        let e: FileError = StoreError::Forbidden("a.pdf".into()).into();
        assert!(matches!(e, FileError::Storage(m) if m.contains("Forbidden")));
    }
}
