//! Prompt templates keyed by document type and operation
//!
//! Template text is opaque to the pipeline apart from `{name}` placeholders.
//! On disk a library is a directory holding `classification.txt` plus one
//! `<label>.<operation>.txt` file per template, e.g.
//! `BankStatement.reprocess-with-context.txt`.

use crate::error::ExtractorError;
use docket_domain::{DocType, DocTypeRegistry, PromptOperation};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// File name of the classification template
pub const CLASSIFICATION_FILE: &str = "classification.txt";

/// Immutable set of prompt templates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptLibrary {
    classification: String,
    templates: HashMap<(DocType, PromptOperation), String>,
}

impl PromptLibrary {
    /// Library with only a classification template
    pub fn new(classification: impl Into<String>) -> Self {
        Self {
            classification: classification.into(),
            templates: HashMap::new(),
        }
    }

    /// Add or replace a template
    pub fn with_template(
        mut self,
        doc_type: DocType,
        operation: PromptOperation,
        text: impl Into<String>,
    ) -> Self {
        self.templates.insert((doc_type, operation), text.into());
        self
    }

    /// Load every template found in a directory
    ///
    /// Missing files are not an error here; [`PromptLibrary::validate`]
    /// decides what a registry needs.
    pub fn load_dir(dir: &Path) -> Result<Self, ExtractorError> {
        let classification = std::fs::read_to_string(dir.join(CLASSIFICATION_FILE))?;
        let mut library = Self::new(classification);
        for doc_type in DocType::ALL {
            for operation in PromptOperation::ALL {
                let path = dir.join(file_name(doc_type, operation));
                if path.is_file() {
                    let text = std::fs::read_to_string(&path)?;
                    library.templates.insert((doc_type, operation), text);
                }
            }
        }
        debug!("Loaded {} templates from {}", library.templates.len(), dir.display());
        Ok(library)
    }

    /// Write every template to a directory, creating it if needed
    pub fn write_dir(&self, dir: &Path) -> Result<usize, ExtractorError> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(CLASSIFICATION_FILE), &self.classification)?;
        for ((doc_type, operation), text) in &self.templates {
            std::fs::write(dir.join(file_name(*doc_type, *operation)), text)?;
        }
        Ok(self.templates.len() + 1)
    }

    /// Check that every template the registry needs is present
    ///
    /// Every type needs extraction and audit templates; types with a repair
    /// profile also need both reprocessing templates.
    pub fn validate(&self, registry: &DocTypeRegistry) -> Result<(), ExtractorError> {
        for doc_type in registry.doc_types() {
            let profile = registry
                .get(doc_type)
                .map_err(|_| ExtractorError::MissingTemplate {
                    doc_type,
                    operation: PromptOperation::Extraction,
                })?;
            for operation in PromptOperation::ALL {
                if operation.is_repair() && profile.repair.is_none() {
                    continue;
                }
                self.get(doc_type, operation)?;
            }
        }
        Ok(())
    }

    /// Template for a type and operation
    pub fn get(
        &self,
        doc_type: DocType,
        operation: PromptOperation,
    ) -> Result<&str, ExtractorError> {
        self.templates
            .get(&(doc_type, operation))
            .map(String::as_str)
            .ok_or(ExtractorError::MissingTemplate { doc_type, operation })
    }

    /// Classification prompt listing the registry's categories
    pub fn classification_prompt(&self, registry: &DocTypeRegistry) -> String {
        render(
            &self.classification,
            &[("categories", &registry.category_descriptions())],
        )
    }

    /// Generic English templates for every type in the registry
    ///
    /// Good enough to run the pipeline end to end; production deployments
    /// ship their own per-type field lists.
    pub fn defaults(registry: &DocTypeRegistry) -> Self {
        let mut library = Self::new(DEFAULT_CLASSIFICATION);
        for doc_type in registry.doc_types() {
            let Ok(profile) = registry.get(doc_type) else { continue };
            let label = doc_type.as_str();
            let extraction = DEFAULT_EXTRACTION
                .replace("{label}", label)
                .replace("{description}", &profile.description);
            let audit = DEFAULT_AUDIT.replace("{label}", label);
            library = library
                .with_template(doc_type, PromptOperation::Extraction, extraction)
                .with_template(doc_type, PromptOperation::Audit, audit);
            if profile.repair.is_some() {
                use PromptOperation::{ReprocessWithContext, ReprocessWithoutContext};
                library = library
                    .with_template(doc_type, ReprocessWithContext, DEFAULT_CONTINUE)
                    .with_template(doc_type, ReprocessWithoutContext, DEFAULT_RESTART);
            }
        }
        library
    }
}

fn file_name(doc_type: DocType, operation: PromptOperation) -> String {
    format!("{}.{}.txt", doc_type.as_str(), operation.as_str())
}

/// Replace `{name}` placeholders; unknown placeholders are left as they are
pub fn render(template: &str, bindings: &[(&str, &str)]) -> String {
    bindings
        .iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
}

const DEFAULT_CLASSIFICATION: &str = "\
Classify the attached document into exactly one of these categories:

{categories}

Answer with the category label only. If none fits, answer `uncategorized`.";

const DEFAULT_EXTRACTION: &str = "\
The attached document is a {label}: {description}.
Extract every field it contains as a single JSON object with camelCase keys.
Lists of repeated items must be JSON arrays of objects.
Answer with the JSON object inside a ```json code fence and nothing else.";

const DEFAULT_AUDIT: &str = "\
You are auditing data extracted from a {label} document.
For each field, give a score between 0 and 1 for how reliable the value looks.
Answer inside a ```json code fence with an object of the form
{\"scores\": {\"<field>\": <score>}, \"explanation\": \"<short reasoning>\"}.

Extracted data:
{record}";

const DEFAULT_CONTINUE: &str = "\
Your previous answer was cut off while listing `{list}`.
Continue the `{list}` list {instruction}.
Answer only with the remaining elements as a JSON array inside a ```json code fence.
After the array, close any objects that were left open.";

const DEFAULT_RESTART: &str = "\
Your previous answer was cut off before any element of `{list}` was complete.
Now {instruction}.
Answer only with the elements as a JSON array inside a ```json code fence.
After the array, close any objects that were left open.";

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render() {
        assert_eq!(
            render(
                "after {anchor_1} in {list} {unknown}",
                &[("list", "movements"), ("anchor_1", "12.5")]
            ),
            "after 12.5 in movements {unknown}"
        );
    }

    #[test]
    fn test_defaults_validate_against_builtin() {
        let registry = DocTypeRegistry::builtin();
        let library = PromptLibrary::defaults(&registry);
        assert!(library.validate(&registry).is_ok());
        assert!(library
            .get(DocType::Invoice, PromptOperation::ReprocessWithContext)
            .is_err());
    }

    #[test]
    fn test_missing_repair_template_is_reported() {
        let registry = DocTypeRegistry::builtin();
        let mut library = PromptLibrary::defaults(&registry);
        library
            .templates
            .remove(&(DocType::BankStatement, PromptOperation::ReprocessWithoutContext));
        let err = library.validate(&registry).unwrap_err();
        assert!(matches!(
            err,
            ExtractorError::MissingTemplate {
                doc_type: DocType::BankStatement,
                operation: PromptOperation::ReprocessWithoutContext
            }
        ));
    }

    #[test]
    fn test_classification_prompt_lists_categories() {
        let registry = DocTypeRegistry::builtin();
        let prompt = PromptLibrary::defaults(&registry).classification_prompt(&registry);
        assert!(prompt.contains("- Invoice: "));
        assert!(prompt.contains("- Balance_Fiduciary: "));
        assert!(!prompt.contains("{categories}"));
    }

    #[test]
    fn test_directory_round_trip() {
        let dir = TempDir::new().unwrap();
        let registry = DocTypeRegistry::builtin();
        let library = PromptLibrary::defaults(&registry);
        let written = library.write_dir(dir.path()).unwrap();
        assert!(dir.path().join("BankStatement.reprocess-with-context.txt").is_file());

        let loaded = PromptLibrary::load_dir(dir.path()).unwrap();
        assert_eq!(loaded, library);
        assert_eq!(written, loaded.templates.len() + 1);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let err = PromptLibrary::load_dir(Path::new("/nonexistent/prompts")).unwrap_err();
        assert!(matches!(err, ExtractorError::Io(_)));
    }
}
