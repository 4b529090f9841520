//! Metrics collected over one batch run

use crate::FileError;
use docket_domain::{DocType, FileResult, FileStatus};
use std::collections::BTreeMap;
use std::time::Duration;

/// Counts for one batch run
///
/// Built from the terminal results once every task has finished, plus the
/// listing and flattening counters recorded before tasks start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    /// Files that became tasks
    pub total: usize,

    /// Tasks that ended in PROCESSED
    pub processed: usize,

    /// Tasks that ended in ERROR
    pub errored: usize,

    /// Errors where the classifier could not place the document
    pub invalid_format: usize,

    /// Processed files that needed at least one continuation request
    pub repaired: usize,

    /// Continuation requests across all files
    pub repair_attempts: u32,

    /// Errors caused by cancellation
    pub cancelled: usize,

    /// Listed files that never became tasks
    pub skipped: usize,

    /// Bundles expanded before listing
    pub archives_flattened: usize,

    /// Processed files per classified type
    pub by_type: BTreeMap<DocType, usize>,

    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl BatchSummary {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Summarize a finished run
    pub fn from_results(results: &[FileResult]) -> Self {
        let mut summary = Self::new();
        for result in results {
            summary.record(result);
        }
        summary
    }

    /// Record one terminal result
    pub fn record(&mut self, result: &FileResult) {
        self.total += 1;
        self.repair_attempts += result.repair_attempts;
        match result.status {
            FileStatus::Processed => {
                self.processed += 1;
                if result.repair_attempts > 0 {
                    self.repaired += 1;
                }
                if let Some(doc_type) = result.classified_as {
                    *self.by_type.entry(doc_type).or_insert(0) += 1;
                }
            }
            _ => {
                self.errored += 1;
                if result.invalid_format {
                    self.invalid_format += 1;
                }
                let cancelled = FileError::Cancelled.to_string();
                if result.error_reason.as_deref() == Some(cancelled.as_str()) {
                    self.cancelled += 1;
                }
            }
        }
    }

    /// Share of tasks that ended in PROCESSED
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.processed as f64 / self.total as f64
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Batch Summary".to_string(),
            "=============".to_string(),
            format!("Files: {}", self.total),
            format!("Processed: {}", self.processed),
            format!("Errors: {}", self.errored),
            format!("  Invalid format: {}", self.invalid_format),
            format!("  Cancelled: {}", self.cancelled),
            format!("Repaired: {} ({} continuation requests)", self.repaired, self.repair_attempts),
            format!("Skipped at listing: {}", self.skipped),
            format!("Archives flattened: {}", self.archives_flattened),
            format!("Elapsed: {:.1}s", self.elapsed.as_secs_f64()),
        ];

        if !self.by_type.is_empty() {
            lines.push(String::new());
            lines.push("Processed by type:".to_string());
            for (doc_type, count) in &self.by_type {
                lines.push(format!("  {}: {}", doc_type, count));
            }
        }

        lines.join("\n")
    }
}
