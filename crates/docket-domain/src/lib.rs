//! Docket Domain Layer
//!
//! Core data model and trait seams for the document batch pipeline. Every
//! other crate in the workspace depends on the types defined here; none of
//! them are defined anywhere else.
//!
//! ## Key Concepts
//!
//! - **DocType**: the closed set of document categories the pipeline knows
//! - **FileTask**: one discovered file moving through the stage machine
//! - **ExtractionAttempt**: one raw model response and whether it parsed
//! - **RepairContext**: which list was mid-fill and where to resume it
//! - **DocumentEntity**: the typed record, a tagged union keyed by DocType
//! - **DocTypeRegistry**: immutable per-type configuration built at startup
//!
//! ## Architecture
//!
//! Pure data plus the two collaborator traits (`ExtractionAdapter`,
//! `DocumentStore`). Network and filesystem implementations live in
//! `docket-llm` and `docket-store`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attempt;
pub mod doctype;
pub mod entity;
pub mod error;
mod lenient;
pub mod registry;
pub mod result;
pub mod task;
pub mod traits;

// Re-exports for convenience
pub use attempt::{Anchor, ExtractionAttempt, RepairContext};
pub use doctype::DocType;
pub use entity::DocumentEntity;
pub use error::{AdapterError, DomainError, StoreError};
pub use registry::{
    DocTypeProfile, DocTypeRegistry, ListSpec, PromptOperation, RepairProfile, ScoringScheme,
};
pub use result::{FileResult, ScoreResult};
pub use task::{BatchRequest, FileRef, FileStatus, FileTask};
pub use traits::{Document, DocumentStore, ExtractionAdapter};
