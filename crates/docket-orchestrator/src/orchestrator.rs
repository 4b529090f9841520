//! Batch orchestrator

use crate::archive::flatten_archives;
use crate::listing::select_files;
use crate::pipeline::Pipeline;
use crate::{BatchSummary, CancelSignal, FileError, OrchestratorConfig, OrchestratorError};
use docket_domain::{
    BatchRequest, DocType, DocTypeRegistry, Document, DocumentStore, ExtractionAdapter, FileRef,
    FileResult, FileTask,
};
use docket_extractor::PromptLibrary;
use docket_scoring::ScoringEngine;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info};

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// The request that drove the run
    pub request: BatchRequest,
    /// One terminal result per task, in listing order
    pub results: Vec<FileResult>,
    /// Counts over `results` plus listing and flattening
    pub summary: BatchSummary,
    /// Dropped archive entries, untouched archives and skipped files
    pub warnings: Vec<String>,
}

/// Runs batches of documents through classification, extraction and scoring
///
/// Registry, prompts and configuration are fixed at construction and shared
/// by every run. Gates are created per run.
///
/// # Examples
///
/// ```
/// use docket_domain::DocTypeRegistry;
/// use docket_extractor::PromptLibrary;
/// use docket_llm::MockAdapter;
/// use docket_orchestrator::{BatchOrchestrator, OrchestratorConfig};
/// use docket_store::MemoryStore;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let registry = Arc::new(DocTypeRegistry::builtin());
/// let store = MemoryStore::new();
/// store.insert("inbox", "scan.pdf", b"%PDF".to_vec());
///
/// let orchestrator = BatchOrchestrator::new(
///     Arc::new(MockAdapter::new()),
///     Arc::new(store),
///     registry.clone(),
///     PromptLibrary::defaults(&registry),
///     OrchestratorConfig::default(),
/// );
/// let report = orchestrator.run_batch("inbox", "any").await.unwrap();
/// assert_eq!(report.results.len(), 1);
/// assert!(report.results[0].invalid_format);
/// # });
/// ```
pub struct BatchOrchestrator<A: ?Sized, S: ?Sized> {
    adapter: Arc<A>,
    store: Arc<S>,
    registry: Arc<DocTypeRegistry>,
    prompts: Arc<PromptLibrary>,
    config: OrchestratorConfig,
}

impl<A, S> BatchOrchestrator<A, S>
where
    A: ExtractionAdapter + ?Sized + 'static,
    S: DocumentStore + ?Sized + 'static,
{
    /// Create an orchestrator
    pub fn new(
        adapter: Arc<A>,
        store: Arc<S>,
        registry: Arc<DocTypeRegistry>,
        prompts: PromptLibrary,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            adapter,
            store,
            registry,
            prompts: Arc::new(prompts),
            config,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run one batch to completion
    ///
    /// See [`run_batch_with_cancel`](Self::run_batch_with_cancel).
    pub async fn run_batch(
        &self,
        container: &str,
        requested_doc_type: &str,
    ) -> Result<BatchReport, OrchestratorError> {
        self.run_batch_with_cancel(container, requested_doc_type, CancelSignal::never())
            .await
    }

    /// Run one batch, stopping early if `cancel` fires
    ///
    /// Archives are flattened first, then the container is listed and every
    /// selected file runs as its own task. The call returns once every task
    /// is terminal. Tasks still running when `cancel` fires end in ERROR at
    /// their next suspension point.
    ///
    /// # Errors
    ///
    /// - `Configuration` for invalid settings or a missing prompt template,
    ///   before anything is touched
    /// - `Listing` when the container cannot be listed
    ///
    /// Per-file failures never surface here; they are in the results.
    pub async fn run_batch_with_cancel(
        &self,
        container: &str,
        requested_doc_type: &str,
        cancel: CancelSignal,
    ) -> Result<BatchReport, OrchestratorError> {
        let started = Instant::now();
        self.validate()?;

        let request = BatchRequest::new(container, requested_doc_type);
        info!(
            "Batch {} started on `{}` (requested: {})",
            request.batch_id, container, requested_doc_type
        );

        let flattened = flatten_archives(self.store.as_ref(), container, &self.config)
            .await
            .map_err(OrchestratorError::Listing)?;
        let files = self
            .store
            .list_files(container)
            .await
            .map_err(OrchestratorError::Listing)?;
        let listing = select_files(request.batch_id, files, &self.config);

        let pipeline = Arc::new(self.pipeline(requested_doc_type, None, cancel));

        let (names, handles): (Vec<String>, Vec<_>) = listing
            .tasks
            .into_iter()
            .map(|task| {
                let name = task.file_name().to_string();
                (name, tokio::spawn(pipeline.clone().run(task)))
            })
            .unzip();

        let results: Vec<FileResult> = names
            .into_iter()
            .zip(join_all(handles).await)
            .map(|(name, joined)| {
                joined.unwrap_or_else(|e| {
                    error!("Task for {} did not finish: {}", name, e);
                    FileResult::error(name, FileError::Internal(e.to_string()).to_string())
                })
            })
            .collect();

        let mut summary = BatchSummary::from_results(&results);
        summary.skipped = listing.skipped.len();
        summary.archives_flattened = flattened.archives_flattened;
        summary.elapsed = started.elapsed();
        info!(
            "Batch {} finished: {} processed, {} errors, {} skipped in {:.1}s",
            request.batch_id,
            summary.processed,
            summary.errored,
            summary.skipped,
            summary.elapsed.as_secs_f64()
        );

        let mut warnings = flattened.warnings;
        warnings.extend(listing.skipped.into_iter().map(|path| format!("{}: skipped", path)));

        Ok(BatchReport {
            request,
            results,
            summary,
            warnings,
        })
    }

    /// Classify, extract and score one document held in memory
    ///
    /// Unlike a batch run, the classification must equal `doc_type`
    /// exactly. Any other category ends the document in `ERROR` before
    /// extraction.
    ///
    /// # Errors
    ///
    /// `Configuration` when the settings or prompt templates are invalid.
    /// Everything that goes wrong with the document itself is reported in
    /// the returned `FileResult`.
    pub async fn process_one(
        &self,
        document: Document,
        doc_type: DocType,
    ) -> Result<FileResult, OrchestratorError> {
        self.validate()?;
        let request = BatchRequest::new("", doc_type.as_str());
        info!(
            "Single document {} as {} (batch {})",
            document.file_name, doc_type, request.batch_id
        );

        let file = FileRef::new("", document.file_name.as_str(), document.bytes.len() as u64);
        let task = FileTask::new(request.batch_id, file);
        let pipeline = self.pipeline(doc_type.as_str(), Some(doc_type), CancelSignal::never());
        Ok(pipeline.run_document(task, document).await)
    }

    fn validate(&self) -> Result<(), OrchestratorError> {
        self.config
            .validate()
            .map_err(OrchestratorError::Configuration)?;
        self.prompts
            .validate(&self.registry)
            .map_err(|e| OrchestratorError::Configuration(e.to_string()))
    }

    /// Fresh gates for every run
    fn pipeline(
        &self,
        requested: &str,
        strict_type: Option<DocType>,
        cancel: CancelSignal,
    ) -> Pipeline<A, S> {
        Pipeline {
            adapter: self.adapter.clone(),
            store: self.store.clone(),
            registry: self.registry.clone(),
            prompts: self.prompts.clone(),
            scoring: ScoringEngine::new(self.registry.clone()),
            config: self.config.clone(),
            policy: self.config.retry_policy(),
            classification_prompt: self.prompts.classification_prompt(&self.registry),
            requested: requested.to_string(),
            strict_type,
            download_gate: Arc::new(Semaphore::new(self.config.download_concurrency)),
            processing_gate: Arc::new(Semaphore::new(self.config.processing_concurrency)),
            cancel,
        }
    }
}
