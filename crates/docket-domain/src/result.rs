//! Terminal per-file results

use crate::{DocType, DocumentEntity, FileStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quality score of one parsed record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// 0..=1 for weighted types, 0..=100 for presence types
    pub score: f64,
    /// Human-readable reasoning
    pub explanation: String,
    /// Fields the audit flagged, with the audit's remark when one was found
    pub field_issues: BTreeMap<String, Option<String>>,
}

/// Outcome for one discovered file
///
/// A batch returns exactly one of these per file, whatever happened to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    /// Final path segment of the file; archive entries keep their inner name
    pub file_name: String,
    /// Archive the file came from, for entries unpacked from one
    pub parent_archive: Option<String>,
    /// `Processed` or `Error`
    pub status: FileStatus,
    /// Category the classifier assigned, if classification finished
    pub classified_as: Option<DocType>,
    /// Set when the classifier could not place the document
    pub invalid_format: bool,
    /// Typed record, for processed files
    pub entity: Option<DocumentEntity>,
    /// Score, for processed files
    pub score: Option<f64>,
    /// Score reasoning, for processed files
    pub score_explanation: Option<String>,
    /// Fields the audit flagged
    pub field_issues: BTreeMap<String, Option<String>>,
    /// Why the file failed
    pub error_reason: Option<String>,
    /// Continuation requests spent repairing a truncated response
    pub repair_attempts: u32,
}

impl FileResult {
    /// Failed result with no record
    pub fn error(file_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            parent_archive: None,
            status: FileStatus::Error,
            classified_as: None,
            invalid_format: false,
            entity: None,
            score: None,
            score_explanation: None,
            field_issues: BTreeMap::new(),
            error_reason: Some(reason.into()),
            repair_attempts: 0,
        }
    }

    /// Whether the file made it to `Processed`
    pub fn is_processed(&self) -> bool {
        self.status == FileStatus::Processed
    }
}
