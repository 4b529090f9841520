//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::commands::run::load_prompts;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use docket_domain::{DocType, DocTypeRegistry, Document, ExtractionAdapter, FileResult, FileStatus};
use docket_extractor::PromptLibrary;
use docket_llm::GeminiAdapter;
use docket_orchestrator::{BatchOrchestrator, OrchestratorConfig};
use docket_store::MemoryStore;
use std::sync::Arc;

/// Execute the extract command.
pub async fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let doc_type = DocType::parse(&args.doc_type).ok_or_else(|| {
        CliError::InvalidInput(format!("unknown document type `{}`", args.doc_type))
    })?;
    let file_name = args
        .file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CliError::InvalidInput(format!("{} is not a file", args.file.display())))?
        .to_string();
    let bytes = tokio::fs::read(&args.file).await?;

    let registry = Arc::new(DocTypeRegistry::builtin());
    let prompts_dir = args.prompts.as_deref().or(config.prompts_dir.as_deref());
    let prompts = load_prompts(prompts_dir, &registry)?;
    let adapter = GeminiAdapter::new(config.adapter.clone())
        .map_err(|e| CliError::Config(e.to_string()))?;

    let result = extract_document(
        Arc::new(adapter),
        registry,
        prompts,
        config.orchestrator.clone(),
        Document::new(file_name, bytes),
        doc_type,
    )
    .await?;

    println!("{}", formatter.format_result(&result)?);
    match (result.status, result.error_reason) {
        (FileStatus::Error, Some(reason)) => Err(CliError::Rejected(reason)),
        _ => Ok(()),
    }
}

/// Run one in-memory document through the pipeline
pub async fn extract_document<A>(
    adapter: Arc<A>,
    registry: Arc<DocTypeRegistry>,
    prompts: PromptLibrary,
    config: OrchestratorConfig,
    document: Document,
    doc_type: DocType,
) -> Result<FileResult>
where
    A: ExtractionAdapter + 'static,
{
    // Nothing is listed or downloaded
    let store = Arc::new(MemoryStore::new());
    let orchestrator = BatchOrchestrator::new(adapter, store, registry, prompts, config);
    Ok(orchestrator.process_one(document, doc_type).await?)
}
