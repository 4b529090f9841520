//! Docket Extraction Adapters
//!
//! Implementations of the `ExtractionAdapter` trait from `docket-domain`.
//! Adapters send documents and prompts to a generative model and hand back
//! the raw text; they never parse it.
//!
//! # Adapters
//!
//! - `MockAdapter`: scripted responses for tests, no network
//! - `GeminiAdapter`: Google Generative Language REST API
//!
//! # Examples
//!
//! ```
//! use docket_domain::{Document, ExtractionAdapter};
//! use docket_llm::MockAdapter;
//!
//! # tokio_test::block_on(async {
//! let adapter = MockAdapter::new();
//! adapter.set_classification("a.pdf", "Invoice");
//! let doc = Document::new("a.pdf", vec![]);
//! assert_eq!(adapter.classify(&doc, "which category?").await.unwrap(), "Invoice");
//! # });
//! ```

#![warn(missing_docs)]

pub mod gemini;
pub mod mock;

pub use gemini::{AdapterConfig, GeminiAdapter};
pub use mock::{MockAdapter, MockCall, MockOperation};
