//! Scripted adapter for tests
//!
//! Responses are keyed by file name (classify/extract) or by a prompt
//! substring (prompt-only). Extraction responses are queued so a test can
//! script a truncated first answer followed by its continuation.

use async_trait::async_trait;
use docket_domain::doctype::UNCATEGORIZED;
use docket_domain::{AdapterError, Document, ExtractionAdapter};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Which adapter method a call went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOperation {
    /// `classify`
    Classify,
    /// `extract`
    Extract,
    /// `prompt_only`
    PromptOnly,
}

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    /// Method called
    pub operation: MockOperation,
    /// Document name, for document calls
    pub file_name: Option<String>,
    /// Prompt text sent
    pub prompt: String,
}

#[derive(Debug, Default)]
struct Script {
    classifications: HashMap<String, Result<String, AdapterError>>,
    extractions: HashMap<String, VecDeque<Result<String, AdapterError>>>,
    prompt_responses: Vec<(String, Result<String, AdapterError>)>,
    calls: Vec<MockCall>,
}

/// Mock adapter for deterministic testing
///
/// Clones share the same script and call log.
///
/// # Examples
///
/// ```
/// use docket_domain::{Document, ExtractionAdapter};
/// use docket_llm::MockAdapter;
///
/// # tokio_test::block_on(async {
/// let adapter = MockAdapter::new();
/// adapter.push_extraction("a.pdf", r#"{"nit": "1"}"#);
/// let doc = Document::new("a.pdf", vec![]);
/// assert_eq!(adapter.extract(&doc, "fields").await.unwrap(), r#"{"nit": "1"}"#);
/// assert_eq!(adapter.call_count(), 1);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockAdapter {
    script: Arc<Mutex<Script>>,
    default_extraction: String,
    default_prompt_response: String,
    latency: Duration,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockAdapter {
    /// Create a mock that classifies everything as uncategorized
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            default_extraction: "{}".to_string(),
            default_prompt_response: r#"{"scores": {}, "explanation": ""}"#.to_string(),
            latency: Duration::ZERO,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleep this long inside every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Response for prompt-only calls that match no registered substring
    pub fn with_default_prompt_response(mut self, response: impl Into<String>) -> Self {
        self.default_prompt_response = response.into();
        self
    }

    /// Label to return when classifying `file_name`
    pub fn set_classification(&self, file_name: impl Into<String>, label: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .classifications
            .insert(file_name.into(), Ok(label.into()));
    }

    /// Make classification of `file_name` fail
    pub fn set_classification_error(&self, file_name: impl Into<String>, error: AdapterError) {
        self.script
            .lock()
            .unwrap()
            .classifications
            .insert(file_name.into(), Err(error));
    }

    /// Queue the next extraction response for `file_name`
    pub fn push_extraction(&self, file_name: impl Into<String>, response: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .extractions
            .entry(file_name.into())
            .or_default()
            .push_back(Ok(response.into()));
    }

    /// Queue an extraction failure for `file_name`
    pub fn push_extraction_error(&self, file_name: impl Into<String>, error: AdapterError) {
        self.script
            .lock()
            .unwrap()
            .extractions
            .entry(file_name.into())
            .or_default()
            .push_back(Err(error));
    }

    /// Answer prompt-only calls containing `needle` with `response`
    ///
    /// The first registered needle that matches wins.
    pub fn add_prompt_response(&self, needle: impl Into<String>, response: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .prompt_responses
            .push((needle.into(), Ok(response.into())));
    }

    /// Fail prompt-only calls containing `needle`
    pub fn add_prompt_error(&self, needle: impl Into<String>, error: AdapterError) {
        self.script
            .lock()
            .unwrap()
            .prompt_responses
            .push((needle.into(), Err(error)));
    }

    /// Total number of calls
    pub fn call_count(&self) -> usize {
        self.script.lock().unwrap().calls.len()
    }

    /// Every recorded call, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.script.lock().unwrap().calls.clone()
    }

    /// Calls of one kind for one file
    pub fn calls_for(&self, operation: MockOperation, file_name: &str) -> Vec<MockCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation == operation && c.file_name.as_deref() == Some(file_name))
            .collect()
    }

    /// Highest number of calls that were running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, call: MockCall) {
        self.script.lock().unwrap().calls.push(call);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionAdapter for MockAdapter {
    async fn classify(&self, document: &Document, prompt: &str) -> Result<String, AdapterError> {
        self.enter(MockCall {
            operation: MockOperation::Classify,
            file_name: Some(document.file_name.clone()),
            prompt: prompt.to_string(),
        })
        .await;
        let result = self
            .script
            .lock()
            .unwrap()
            .classifications
            .get(&document.file_name)
            .cloned()
            .unwrap_or_else(|| Ok(UNCATEGORIZED.to_string()));
        self.leave();
        result
    }

    async fn extract(
        &self,
        document: &Document,
        field_prompt: &str,
    ) -> Result<String, AdapterError> {
        self.enter(MockCall {
            operation: MockOperation::Extract,
            file_name: Some(document.file_name.clone()),
            prompt: field_prompt.to_string(),
        })
        .await;
        let result = self
            .script
            .lock()
            .unwrap()
            .extractions
            .get_mut(&document.file_name)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Ok(self.default_extraction.clone()));
        self.leave();
        result
    }

    async fn prompt_only(&self, prompt: &str) -> Result<String, AdapterError> {
        self.enter(MockCall {
            operation: MockOperation::PromptOnly,
            file_name: None,
            prompt: prompt.to_string(),
        })
        .await;
        let result = self
            .script
            .lock()
            .unwrap()
            .prompt_responses
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Ok(self.default_prompt_response.clone()));
        self.leave();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> Document {
        Document::new(name, b"bytes".to_vec())
    }

    #[tokio::test]
    async fn test_unknown_file_is_uncategorized() {
        let adapter = MockAdapter::new();
        assert_eq!(adapter.classify(&doc("x.pdf"), "p").await.unwrap(), "uncategorized");
    }

    #[tokio::test]
    async fn test_extraction_queue_then_default() {
        let adapter = MockAdapter::new();
        adapter.push_extraction("a.pdf", "first");
        adapter.push_extraction_error("a.pdf", AdapterError::Transient("429".into()));
        adapter.push_extraction("a.pdf", "third");

        let d = doc("a.pdf");
        assert_eq!(adapter.extract(&d, "p").await.unwrap(), "first");
        assert!(adapter.extract(&d, "p").await.unwrap_err().is_transient());
        assert_eq!(adapter.extract(&d, "p").await.unwrap(), "third");
        assert_eq!(adapter.extract(&d, "p").await.unwrap(), "{}");
        assert_eq!(adapter.calls_for(MockOperation::Extract, "a.pdf").len(), 4);
    }

    #[tokio::test]
    async fn test_prompt_needles() {
        let adapter = MockAdapter::new().with_default_prompt_response("fallback");
        adapter.add_prompt_response("invoice", "audit-1");
        adapter.add_prompt_error("broken", AdapterError::Permanent("400".into()));

        assert_eq!(adapter.prompt_only("audit this invoice").await.unwrap(), "audit-1");
        assert!(adapter.prompt_only("broken prompt").await.is_err());
        assert_eq!(adapter.prompt_only("other").await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let a = MockAdapter::new();
        let b = a.clone();
        a.set_classification("z.png", "Email");
        assert_eq!(b.classify(&doc("z.png"), "p").await.unwrap(), "Email");
        assert_eq!(a.call_count(), 1);
    }

    #[tokio::test]
    async fn test_in_flight_tracking() {
        let adapter = MockAdapter::new().with_latency(Duration::from_millis(20));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let a = adapter.clone();
                tokio::spawn(async move { a.prompt_only(&format!("p{}", i)).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert!(adapter.max_in_flight() >= 2);
    }
}
