//! Docket Scoring
//!
//! Turns a field-by-field audit of an extracted record into one quality
//! score per file.
//!
//! Two schemes exist, picked per document type by the registry:
//! - **weighted**: `Σ audit·weight / Σ weight`, clamped to `0..=1`
//! - **presence**: share of required fields present, `0..=100`
//!
//! # Examples
//!
//! ```
//! use docket_domain::{DocType, DocTypeRegistry};
//! use docket_scoring::ScoringEngine;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let engine = ScoringEngine::new(Arc::new(DocTypeRegistry::builtin()));
//! let audit = json!({"email": 1, "subject": 1, "body": 1, "date": 0, "attachment_count": 0});
//! let (score, explanation) = engine
//!     .score(DocType::Email, audit.as_object().unwrap())
//!     .unwrap();
//! assert_eq!(score, 60.0);
//! assert_eq!(explanation, "Missing fields: date, attachment_count.");
//! ```

#![warn(missing_docs)]

mod audit;
mod engine;
mod error;

pub use audit::AuditReport;
pub use engine::ScoringEngine;
pub use error::ScoringError;
