//! Bounded truncation recovery
//!
//! Drives the scanner and resolver against the model until the record
//! parses or the document type's continuation budget is spent.

use crate::error::{ExtractorError, RecoveryError};
use crate::parser::{json_body, parse_record};
use crate::prompt::PromptLibrary;
use crate::resolver::{continuation_prompt, finalize, resolve, stitch};
use crate::retry::{with_retries, RetryPolicy};
use crate::scanner::{close, ends_on_complete_value, truncate_to_complete, unclosed};
use docket_domain::{DocType, Document, ExtractionAdapter, ExtractionAttempt, RepairProfile};
use serde_json::Value;
use tracing::{debug, info, warn};

/// A record recovered from a truncated response
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryOutcome {
    /// The parsed record
    pub record: Value,
    /// Every attempt, starting with the truncated original
    pub attempts: Vec<ExtractionAttempt>,
    /// Continuation requests sent to the model
    pub continuation_requests: u32,
}

/// Repairs truncated extraction responses for one file at a time
pub struct Recovery<'a, A: ExtractionAdapter + ?Sized> {
    adapter: &'a A,
    prompts: &'a PromptLibrary,
    policy: RetryPolicy,
}

impl<'a, A: ExtractionAdapter + ?Sized> Recovery<'a, A> {
    /// Create a recovery driver
    pub fn new(adapter: &'a A, prompts: &'a PromptLibrary, policy: RetryPolicy) -> Self {
        Self {
            adapter,
            prompts,
            policy,
        }
    }

    /// Recover a record from the truncated response `raw`
    ///
    /// A response cut off outside every repairable list has no context to
    /// resume from and is aborted without asking the model.
    ///
    /// # Errors
    ///
    /// The returned [`RecoveryError`] carries the continuation requests
    /// already sent, along with one of:
    ///
    /// - `ReprocessingAborted` when the list or an anchor cannot be found
    /// - `ReprocessingExhausted` when the budget runs out
    /// - `Adapter` when a continuation call fails after retries
    /// - `MissingTemplate` when a continuation template is absent
    pub async fn recover(
        &self,
        document: &Document,
        doc_type: DocType,
        profile: &RepairProfile,
        raw: &str,
    ) -> Result<RecoveryOutcome, RecoveryError> {
        let mut requests = 0u32;
        let result = self
            .continue_until_parsed(document, doc_type, profile, raw, &mut requests)
            .await;
        result.map_err(|error| RecoveryError {
            continuation_requests: requests,
            error,
        })
    }

    async fn continue_until_parsed(
        &self,
        document: &Document,
        doc_type: DocType,
        profile: &RepairProfile,
        raw: &str,
        requests: &mut u32,
    ) -> Result<RecoveryOutcome, ExtractorError> {
        let mut attempts = vec![ExtractionAttempt::truncated(raw)];
        let mut current = json_body(raw).to_string();

        while *requests < profile.budget {
            let cleaned = truncate_to_complete(&current);
            let context = resolve(&cleaned, profile)?;
            let template = self
                .prompts
                .get(doc_type, context.continuation_template_ref)?;
            let prompt = continuation_prompt(template, &context);

            *requests += 1;
            debug!(
                "Continuation {}/{} for {} list `{}` ({} anchors)",
                requests,
                profile.budget,
                document.file_name,
                context.array_path,
                context.last_complete_element_anchor.len()
            );

            let response = with_retries(&self.policy, "continuation", || {
                self.adapter.extract(document, &prompt)
            })
            .await?;

            let stitched = stitch(&cleaned, &response, profile);
            let parsed = parse_record(&stitched)
                .or_else(|e| close_locally(&stitched, profile).ok_or(e));
            match parsed {
                Ok(record) => {
                    info!(
                        "Recovered {} after {} continuation(s)",
                        document.file_name, requests
                    );
                    attempts.push(ExtractionAttempt::parsed(stitched, record.clone()));
                    return Ok(RecoveryOutcome {
                        record,
                        attempts,
                        continuation_requests: *requests,
                    });
                }
                Err(e) => {
                    debug!("Stitched response still incomplete: {}", e);
                    attempts.push(ExtractionAttempt::truncated(stitched.clone()));
                    current = stitched;
                }
            }
        }

        warn!(
            "Gave up on {} after {} continuation(s)",
            document.file_name, requests
        );
        Err(ExtractorError::ReprocessingExhausted {
            attempts: *requests,
        })
    }
}

/// Close a stitched response whose lists are complete but whose enclosing
/// objects are still open
///
/// Only applies when the text stops right after a complete value.
fn close_locally(text: &str, profile: &RepairProfile) -> Option<Value> {
    if !ends_on_complete_value(text) {
        return None;
    }
    let stack = unclosed(text)?;
    if stack.is_empty() || stack.contains(&b'[') {
        return None;
    }
    let closed = if stack.len() == 1 {
        finalize(text, profile)
    } else {
        close(text)?
    };
    parse_record(&closed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_domain::ListSpec;

    #[test]
    fn test_close_locally() {
        let profile = RepairProfile {
            lists: vec![ListSpec::new("details", &["accountNumber"])],
            budget: 2,
        };
        let record = close_locally(
            r#"{"details": [{"accountNumber": "1"}], "bank": "X","#,
            &profile,
        )
        .unwrap();
        assert_eq!(record["bank"], "X");

        let record = close_locally(r#"{"details": [], "bank": {"name": "X"}"#, &profile).unwrap();
        assert_eq!(record["bank"]["name"], "X");

        assert!(close_locally(r#"{"details": [{"accountNumber": "1"},"#, &profile).is_none());
        assert!(close_locally(r#"{"bank": "X"#, &profile).is_none());
        assert!(close_locally(r#"{"bank": "#, &profile).is_none());
    }

    #[test]
    fn test_cut_number_is_never_closed_locally() {
        let profile = RepairProfile {
            lists: vec![ListSpec::new("details", &["accountNumber"])],
            budget: 2,
        };
        assert!(close_locally(r#"{"details": [], "total": 12"#, &profile).is_none());
    }
}
