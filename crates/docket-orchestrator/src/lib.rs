//! Docket Orchestrator
//!
//! Runs a batch of documents from a storage container through
//! classification, extraction, truncation recovery and scoring.
//!
//! # Overview
//!
//! A run has four phases:
//! - **Flattening**: top-level `.zip` bundles are expanded in place, once, before listing
//! - **Listing**: the container is listed and filtered into `FileTask`s
//! - **Processing**: every task runs concurrently behind two per-run gates
//! - **Aggregation**: once every task is terminal, results and a `BatchSummary` are returned
//!
//! # Stage machine
//!
//! ```text
//! PENDING → DOWNLOADING → CLASSIFYING → EXTRACTING → SCORING → PROCESSED
//!     └──────────┴─────────────┴────────────┴───────────┴──→ ERROR
//! ```
//!
//! The download gate covers only the download. The processing gate is held
//! from classification through scoring. A task never holds both.
//!
//! # Fault isolation
//!
//! A file's failure becomes its own `FileResult` with an `errorReason`;
//! siblings keep running and the batch always returns one result per task.
//! Only configuration and listing problems fail the whole run.
//!
//! # Cancellation
//!
//! ```
//! use docket_orchestrator::cancel_pair;
//!
//! let (handle, signal) = cancel_pair();
//! // pass `signal` to `run_batch_with_cancel`, keep `handle`
//! handle.cancel();
//! assert!(signal.is_cancelled());
//! ```

#![warn(missing_docs)]

mod archive;
mod cancel;
mod config;
mod error;
mod listing;
mod metrics;
mod orchestrator;
mod pipeline;

pub use archive::{flatten_archives, FlattenReport};
pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use config::{ArchiveLimits, OrchestratorConfig};
pub use error::{FileError, OrchestratorError};
pub use listing::{select_files, Listing};
pub use metrics::BatchSummary;
pub use orchestrator::{BatchOrchestrator, BatchReport};
