//! Error types for the Extractor

use docket_domain::{AdapterError, DocType, PromptOperation};
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Model call failed (after retries, for transient failures)
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// Response is not a JSON object
    #[error("Structural parse error: {0}")]
    StructuralParse(String),

    /// Every continuation request was spent without a parseable result
    #[error("Reprocessing exhausted after {attempts} attempts")]
    ReprocessingExhausted {
        /// Continuation requests made
        attempts: u32,
    },

    /// Repair could not continue (no known list, or anchor missing)
    #[error("Reprocessing aborted: {0}")]
    ReprocessingAborted(String),

    /// The document type has no repair profile
    #[error("Truncated response for {0}, which does not support reprocessing")]
    Unsupported(DocType),

    /// A prompt template is missing
    #[error("Missing {operation} template for {doc_type}")]
    MissingTemplate {
        /// Document type
        doc_type: DocType,
        /// Operation
        operation: PromptOperation,
    },

    /// Templates could not be read
    #[error("Template I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A recovery that failed, with the continuation requests it had sent
#[derive(Error, Debug)]
#[error("{error}")]
pub struct RecoveryError {
    /// Continuation requests sent before the failure
    pub continuation_requests: u32,
    /// What stopped the recovery
    #[source]
    pub error: ExtractorError,
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::StructuralParse(e.to_string())
    }
}
