//! Run command implementation.

use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use docket_domain::DocTypeRegistry;
use docket_extractor::PromptLibrary;
use docket_llm::GeminiAdapter;
use docket_orchestrator::{cancel_pair, BatchOrchestrator, OrchestratorConfig};
use docket_store::LocalDirStore;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Execute the run command.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    if !args.source.is_dir() {
        return Err(CliError::InvalidInput(format!(
            "{} is not a directory",
            args.source.display()
        )));
    }

    let registry = Arc::new(DocTypeRegistry::builtin());
    let prompts_dir = args.prompts.as_deref().or(config.prompts_dir.as_deref());
    let prompts = load_prompts(prompts_dir, &registry)?;
    let orchestrator_config = effective_config(&args, &config.orchestrator);

    let adapter = GeminiAdapter::new(config.adapter.clone())
        .map_err(|e| CliError::Config(e.to_string()))?;
    let store = LocalDirStore::new(&args.source);
    let orchestrator = BatchOrchestrator::new(
        Arc::new(adapter),
        Arc::new(store),
        registry,
        prompts,
        orchestrator_config,
    );

    let (handle, signal) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remaining files");
            handle.cancel();
        }
    });

    let report = orchestrator
        .run_batch_with_cancel(&args.container, &args.doc_type, signal)
        .await?;

    for warning in &report.warnings {
        eprintln!("{}", formatter.warning(warning));
    }
    println!("{}", formatter.format_report(&report)?);

    if report.summary.errored > 0 {
        info!("{} file(s) ended in ERROR", report.summary.errored);
    }
    Ok(())
}

/// Templates from a directory, or the built-in ones
pub fn load_prompts(dir: Option<&Path>, registry: &DocTypeRegistry) -> Result<PromptLibrary> {
    match dir {
        Some(dir) => {
            let library = PromptLibrary::load_dir(dir)?;
            library.validate(registry)?;
            Ok(library)
        }
        None => Ok(PromptLibrary::defaults(registry)),
    }
}

/// Apply preset and gate overrides on top of the file's settings
fn effective_config(args: &RunArgs, base: &OrchestratorConfig) -> OrchestratorConfig {
    let mut config = args.preset.map(Into::into).unwrap_or_else(|| base.clone());
    if let Some(n) = args.download_concurrency {
        config.download_concurrency = n;
    }
    if let Some(n) = args.processing_concurrency {
        config.processing_concurrency = n;
    }
    config
}
