//! Per-file stage machine
//!
//! One [`Pipeline`] is shared by every task of a run. It owns the run's two
//! gates; each task walks its own `FileTask` through the stages and turns
//! whatever happened into exactly one `FileResult`.

use crate::{CancelSignal, FileError, OrchestratorConfig};
use docket_domain::{
    DocType, DocTypeRegistry, Document, DocumentEntity, DocumentStore, ExtractionAdapter,
    FileResult, FileStatus, FileTask, PromptOperation, ScoreResult,
};
use docket_extractor::parser::parse_record;
use docket_extractor::{render, with_retries, PromptLibrary, Recovery, RetryPolicy};
use docket_scoring::{AuditReport, ScoringEngine};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

/// What a task learned before it finished or failed
#[derive(Debug, Default)]
struct Progress {
    classified_as: Option<DocType>,
    repair_attempts: u32,
}

/// Shared state for the tasks of one run
pub(crate) struct Pipeline<A: ?Sized, S: ?Sized> {
    pub(crate) adapter: Arc<A>,
    pub(crate) store: Arc<S>,
    pub(crate) registry: Arc<DocTypeRegistry>,
    pub(crate) prompts: Arc<PromptLibrary>,
    pub(crate) scoring: ScoringEngine,
    pub(crate) config: OrchestratorConfig,
    pub(crate) policy: RetryPolicy,
    pub(crate) classification_prompt: String,
    pub(crate) requested: String,
    pub(crate) strict_type: Option<DocType>,
    pub(crate) download_gate: Arc<Semaphore>,
    pub(crate) processing_gate: Arc<Semaphore>,
    pub(crate) cancel: CancelSignal,
}

impl<A, S> Pipeline<A, S>
where
    A: ExtractionAdapter + ?Sized,
    S: DocumentStore + ?Sized,
{
    /// Drive one listed task to a terminal state
    pub(crate) async fn run(self: Arc<Self>, task: FileTask) -> FileResult {
        self.run_with(task, None).await
    }

    /// Drive a task whose document is already in memory
    pub(crate) async fn run_document(&self, task: FileTask, document: Document) -> FileResult {
        self.run_with(task, Some(document)).await
    }

    async fn run_with(&self, mut task: FileTask, supplied: Option<Document>) -> FileResult {
        let mut progress = Progress::default();
        match self.process(&mut task, supplied, &mut progress).await {
            Ok((entity, score)) => {
                info!(
                    "{} processed as {} (score {:.3})",
                    task.file.path,
                    entity.doc_type(),
                    score.score
                );
                FileResult {
                    file_name: task.file_name().to_string(),
                    parent_archive: task.parent_archive_name.clone(),
                    status: task.status(),
                    classified_as: progress.classified_as,
                    invalid_format: false,
                    entity: Some(entity),
                    score: Some(score.score),
                    score_explanation: Some(score.explanation),
                    field_issues: score.field_issues,
                    error_reason: None,
                    repair_attempts: progress.repair_attempts,
                }
            }
            Err(e) => {
                let stage = task.status();
                task.fail();
                warn!("{} failed while {}: {}", task.file.path, stage, e);
                let mut result = FileResult::error(task.file_name(), e.to_string());
                result.parent_archive = task.parent_archive_name.clone();
                result.classified_as = progress.classified_as;
                result.invalid_format = matches!(e, FileError::InvalidFormat(_));
                result.repair_attempts = progress.repair_attempts;
                result
            }
        }
    }

    async fn process(
        &self,
        task: &mut FileTask,
        supplied: Option<Document>,
        progress: &mut Progress,
    ) -> Result<(DocumentEntity, ScoreResult), FileError> {
        if task.file.size > self.config.max_file_size_bytes {
            return Err(FileError::FileTooLarge {
                size: task.file.size,
                limit: self.config.max_file_size_bytes,
            });
        }

        advance(task, FileStatus::Downloading)?;
        let document = match supplied {
            Some(document) => document,
            None => {
                let _permit = self.acquire(&self.download_gate).await?;
                let bytes = self.cancel.guard(self.store.download(&task.file)).await??;
                Document::new(task.file_name(), bytes)
            }
        };

        // Held from classification through scoring
        let _permit = self.acquire(&self.processing_gate).await?;

        advance(task, FileStatus::Classifying)?;
        let doc_type = self.classify(&document).await?;
        task.doc_type = Some(doc_type);
        progress.classified_as = Some(doc_type);
        self.check_request(&document, doc_type)?;

        advance(task, FileStatus::Extracting)?;
        let record = self.extract(&document, doc_type, progress).await?;
        let mut entity = DocumentEntity::from_record(doc_type, record.clone())
            .map_err(|e| FileError::StructuralParse(format!("{} record: {}", doc_type, e)))?;
        entity.complete_from_file_name(task.file_name());

        advance(task, FileStatus::Scoring)?;
        let score = self.score(doc_type, &record).await?;

        advance(task, FileStatus::Processed)?;
        Ok((entity, score))
    }

    async fn acquire(&self, gate: &Arc<Semaphore>) -> Result<OwnedSemaphorePermit, FileError> {
        self.cancel
            .guard(gate.clone().acquire_owned())
            .await?
            .map_err(|e| FileError::Internal(e.to_string()))
    }

    async fn classify(&self, document: &Document) -> Result<DocType, FileError> {
        let label = self
            .cancel
            .guard(with_retries(&self.policy, "classification", || {
                self.adapter.classify(document, &self.classification_prompt)
            }))
            .await??;

        DocType::parse(&label)
            .filter(|t| self.registry.get(*t).is_ok())
            .ok_or_else(|| FileError::InvalidFormat(label.trim().to_string()))
    }

    /// Batches only warn on a mismatch; single documents must match exactly
    fn check_request(&self, document: &Document, doc_type: DocType) -> Result<(), FileError> {
        if let Some(requested) = self.strict_type {
            if doc_type != requested {
                return Err(FileError::TypeMismatch {
                    requested,
                    classified: doc_type,
                });
            }
        } else if !doc_type.matches_request(&self.requested) {
            warn!(
                "{} classified as {} but {} was requested",
                document.file_name, doc_type, self.requested
            );
        }
        Ok(())
    }

    async fn extract(
        &self,
        document: &Document,
        doc_type: DocType,
        progress: &mut Progress,
    ) -> Result<Value, FileError> {
        let template = self.prompts.get(doc_type, PromptOperation::Extraction)?;
        let raw = self
            .cancel
            .guard(with_retries(&self.policy, "extraction", || {
                self.adapter.extract(document, template)
            }))
            .await??;

        let parse_error = match parse_record(&raw) {
            Ok(record) => return Ok(record),
            Err(e) => e,
        };

        let profile = self.registry.get(doc_type)?;
        let Some(repair) = profile.repair.as_ref() else {
            debug!("{} response did not parse: {}", document.file_name, parse_error);
            return Err(FileError::UnsupportedType(doc_type));
        };

        debug!(
            "{} response did not parse ({}), starting recovery",
            document.file_name, parse_error
        );
        let recovery = Recovery::new(self.adapter.as_ref(), self.prompts.as_ref(), self.policy);
        match self
            .cancel
            .guard(recovery.recover(document, doc_type, repair, &raw))
            .await?
        {
            Ok(outcome) => {
                progress.repair_attempts = outcome.continuation_requests;
                Ok(outcome.record)
            }
            Err(e) => {
                progress.repair_attempts = e.continuation_requests;
                Err(e.error.into())
            }
        }
    }

    /// Audit the record and score it; a failed audit falls back to the
    /// configured score instead of failing the file
    async fn score(&self, doc_type: DocType, record: &Value) -> Result<ScoreResult, FileError> {
        let template = self.prompts.get(doc_type, PromptOperation::Audit)?;
        let record_json =
            serde_json::to_string_pretty(record).map_err(|e| FileError::Internal(e.to_string()))?;
        let prompt = render(template, &[("record", &record_json)]);

        let response = self
            .cancel
            .guard(with_retries(&self.policy, "audit", || {
                self.adapter.prompt_only(&prompt)
            }))
            .await?;

        let report = response
            .map_err(|e| e.to_string())
            .and_then(|raw| parse_record(&raw).map_err(|e| e.to_string()))
            .and_then(|value| AuditReport::from_value(value).map_err(|e| e.to_string()));

        let result = match report {
            Ok(report) => self.scoring.evaluate(doc_type, &report),
            Err(reason) => {
                warn!("Audit failed for a {} record: {}", doc_type, reason);
                self.scoring
                    .fallback(doc_type, self.config.audit_fallback_score, &reason)
            }
        };
        result.map_err(|e| FileError::Internal(e.to_string()))
    }
}

fn advance(task: &mut FileTask, next: FileStatus) -> Result<(), FileError> {
    task.advance(next)?;
    debug!("{} -> {}", task.file.path, next);
    Ok(())
}
