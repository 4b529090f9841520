//! Docket Extractor
//!
//! Turns raw model output into JSON records and repairs responses that were
//! cut off by the model's output-length limit.
//!
//! # Overview
//!
//! Long documents (bank statements with hundreds of movements, fiduciary
//! balances with one line per account) regularly produce responses that stop
//! in the middle of a list. Instead of failing the file, the extractor cuts
//! the text back to the last complete list element, asks the model to
//! continue after that element, and stitches the answer back in.
//!
//! # Architecture
//!
//! ```text
//! raw text → parser ──ok──→ record
//!              │
//!              └─err─→ scanner → resolver → adapter → stitch → parser
//!                         ↑___________ until budget spent ________|
//! ```
//!
//! - [`scanner`]: pure truncation analysis, no I/O
//! - [`resolver`]: list detection, anchors, continuation prompts, stitching
//! - [`Recovery`]: the bounded loop that drives both against the model
//! - [`PromptLibrary`]: templates keyed by document type and operation
//!
//! # Example Usage
//!
//! ```
//! use docket_domain::{DocType, DocTypeRegistry, Document};
//! use docket_extractor::{PromptLibrary, Recovery, RetryPolicy};
//! use docket_llm::MockAdapter;
//!
//! # tokio_test::block_on(async {
//! let registry = DocTypeRegistry::builtin();
//! let prompts = PromptLibrary::defaults(&registry);
//! let profile = registry.get(DocType::BankStatement).unwrap().repair.clone().unwrap();
//!
//! let adapter = MockAdapter::new();
//! adapter.push_extraction("s.pdf", r#"[{"value": 2, "subsequentBalance": 8}], "trusts": []}"#);
//!
//! let raw = r#"{"movements": [{"value": 1, "subsequentBalance": 10}, {"value": 2, "subs"#;
//! let doc = Document::new("s.pdf", vec![]);
//! let outcome = Recovery::new(&adapter, &prompts, RetryPolicy::none())
//!     .recover(&doc, DocType::BankStatement, &profile, raw)
//!     .await
//!     .unwrap();
//!
//! assert_eq!(outcome.continuation_requests, 1);
//! assert_eq!(outcome.record["movements"].as_array().unwrap().len(), 2);
//! # });
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod prompt;
mod recovery;
pub mod parser;
pub mod resolver;
pub mod retry;
pub mod scanner;


pub use config::ExtractorConfig;
pub use error::{ExtractorError, RecoveryError};
pub use prompt::{render, PromptLibrary, CLASSIFICATION_FILE};
pub use recovery::{Recovery, RecoveryOutcome};
pub use retry::{with_retries, RetryPolicy};
