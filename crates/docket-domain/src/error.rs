//! Error types shared across crate boundaries

use thiserror::Error;

/// Domain invariant violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A FileTask was asked to move to an illegal stage
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    /// Registry lookups for unknown entries
    #[error("Unknown document type: {0}")]
    UnknownDocType(String),
}

/// Failures reported by an extraction adapter
///
/// Only the split between the two variants matters to callers: transient
/// failures are retried, permanent ones fail the file at once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// Rate limit, timeout, connection reset or server-side failure
    #[error("Transient service error: {0}")]
    Transient(String),

    /// Malformed request or unusable response
    #[error("Permanent service error: {0}")]
    Permanent(String),
}

impl AdapterError {
    /// Whether the caller may retry
    pub fn is_transient(&self) -> bool {
        matches!(self, AdapterError::Transient(_))
    }
}

/// Failures reported by a storage collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    /// Object or container does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Access denied
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive could not be read
    #[error("Archive error: {0}")]
    Archive(String),
}
