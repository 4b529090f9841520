//! Prompts command implementation.

use crate::cli::{PromptsAction, PromptsArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use docket_domain::DocTypeRegistry;
use docket_extractor::{PromptLibrary, CLASSIFICATION_FILE};
use std::path::Path;

/// Execute the prompts command.
pub async fn execute_prompts(args: PromptsArgs, formatter: &Formatter) -> Result<()> {
    let registry = DocTypeRegistry::builtin();
    match args.action {
        PromptsAction::Init { dir, force } => init_prompts(&dir, force, &registry, formatter),
        PromptsAction::Check { dir } => check_prompts(&dir, &registry, formatter),
    }
}

/// Write the built-in templates.
fn init_prompts(
    dir: &Path,
    force: bool,
    registry: &DocTypeRegistry,
    formatter: &Formatter,
) -> Result<()> {
    if dir.join(CLASSIFICATION_FILE).exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already holds templates; use --force to overwrite",
            dir.display()
        )));
    }
    let written = PromptLibrary::defaults(registry).write_dir(dir)?;
    println!(
        "{}",
        formatter.success(&format!("Wrote {} templates to {}", written, dir.display()))
    );
    Ok(())
}

/// Load and validate a template directory.
fn check_prompts(dir: &Path, registry: &DocTypeRegistry, formatter: &Formatter) -> Result<()> {
    let library = PromptLibrary::load_dir(dir)?;
    library.validate(registry)?;
    println!(
        "{}",
        formatter.success(&format!(
            "{} has every template for {} document types",
            dir.display(),
            registry.len()
        ))
    );
    Ok(())
}
