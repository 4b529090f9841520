//! Scoring error types

use docket_domain::DomainError;
use thiserror::Error;

/// Errors that can occur while scoring a record
#[derive(Error, Debug)]
pub enum ScoringError {
    /// Document type is not in the registry
    #[error(transparent)]
    Registry(#[from] DomainError),

    /// Audit response does not have the expected shape
    #[error("Invalid audit report: {0}")]
    InvalidAudit(String),
}
