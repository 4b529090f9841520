//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use docket_domain::{FileResult, FileStatus, RepairContext};
use docket_orchestrator::BatchReport;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the results of a batch run.
    pub fn format_report(&self, report: &BatchReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&report.results)?),
            OutputFormat::Table => Ok(self.format_results_table(report)),
            OutputFormat::Quiet => Ok(self.format_results_quiet(&report.results)),
        }
    }

    fn format_results_table(&self, report: &BatchReport) -> String {
        if report.results.is_empty() {
            return self.colorize("No documents found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(HEADER);

        for result in &report.results {
            builder.push_record(self.row(result));
        }

        format!("{}\n\n{}", finish(builder), report.summary.summary())
    }

    /// Format the result of a single document.
    pub fn format_result(&self, result: &FileResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            OutputFormat::Quiet => Ok(self.format_results_quiet(std::slice::from_ref(result))),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(HEADER);
                builder.push_record(self.row(result));
                let mut out = finish(builder);
                if let Some(entity) = &result.entity {
                    out.push_str("\n\n");
                    out.push_str(&serde_json::to_string_pretty(entity)?);
                }
                Ok(out)
            }
        }
    }

    fn row(&self, result: &FileResult) -> [String; 7] {
        let doc_type = result
            .classified_as
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        let score = result
            .score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "-".to_string());
        let detail = match &result.error_reason {
            Some(reason) => reason.clone(),
            None => result.score_explanation.clone().unwrap_or_default(),
        };
        [
            result.file_name.clone(),
            result.parent_archive.clone().unwrap_or_else(|| "-".to_string()),
            doc_type,
            self.status(result),
            score,
            result.repair_attempts.to_string(),
            truncate(&detail, 60),
        ]
    }

    fn format_results_quiet(&self, results: &[FileResult]) -> String {
        results
            .iter()
            .map(|r| format!("{}\t{}", r.status, r.file_name))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn status(&self, result: &FileResult) -> String {
        match result.status {
            FileStatus::Processed => self.colorize("PROCESSED", "green"),
            _ if result.invalid_format => self.colorize("INVALID", "yellow"),
            other => self.colorize(other.as_str(), "red"),
        }
    }

    /// Format where recovery would resume.
    pub fn repair_context(&self, context: &RepairContext) -> String {
        if context.from_beginning() {
            return format!("Resume list `{}` from the beginning", context.array_path);
        }
        let anchors: Vec<String> = context
            .last_complete_element_anchor
            .iter()
            .map(|a| format!("{} = {}", a.attribute, a.value))
            .collect();
        format!(
            "Resume list `{}` after the element with {}",
            context.array_path,
            anchors.join(", ")
        )
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

const HEADER: [&str; 7] = ["File", "Archive", "Type", "Status", "Score", "Repairs", "Detail"];

fn finish(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_domain::{Anchor, BatchRequest, DocType, PromptOperation};
    use docket_orchestrator::BatchSummary;

    fn report() -> BatchReport {
        let mut invalid =
            FileResult::error("a.pdf", "Invalid format: classified as `uncategorized`");
        invalid.invalid_format = true;
        let processed = FileResult {
            status: FileStatus::Processed,
            classified_as: Some(DocType::Invoice),
            score: Some(0.75),
            score_explanation: Some("Weighted audit over 7 fields".to_string()),
            error_reason: None,
            parent_archive: Some("bundle.zip".to_string()),
            ..FileResult::error("b.pdf", "")
        };
        let results = vec![invalid, processed];
        BatchReport {
            request: BatchRequest::new(".", "any"),
            summary: BatchSummary::from_results(&results),
            results,
            warnings: vec![],
        }
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_report(&report()).unwrap();
        assert!(output.contains("Archive"));
        assert!(output.contains("bundle.zip"));
        assert!(output.contains("INVALID"));
        assert!(output.contains("0.75"));
        assert!(output.contains("Batch Summary"));
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_report(&report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["fileName"], "a.pdf");
        assert_eq!(parsed[0]["invalidFormat"], true);
        assert_eq!(parsed[1]["status"], "PROCESSED");
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_report(&report()).unwrap();
        assert_eq!(output, "ERROR\ta.pdf\nPROCESSED\tb.pdf");
    }

    #[test]
    fn test_single_result() {
        let results = report().results;
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_result(&results[0]).unwrap();
        assert!(output.contains("INVALID"));
        assert!(!output.contains("Batch Summary"));

        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_result(&results[1]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["fileName"], "b.pdf");
    }

    #[test]
    fn test_empty_report() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut empty = report();
        empty.results.clear();
        assert!(formatter.format_report(&empty).unwrap().contains("No documents found"));
    }

    #[test]
    fn test_repair_context() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let context = RepairContext {
            array_path: "movements".to_string(),
            last_complete_element_anchor: vec![Anchor {
                attribute: "value".to_string(),
                value: "12.5".to_string(),
            }],
            continuation_template_ref: PromptOperation::ReprocessWithContext,
        };
        assert_eq!(
            formatter.repair_context(&context),
            "Resume list `movements` after the element with value = 12.5"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
