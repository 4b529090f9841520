//! Extraction attempts and truncation repair context

use crate::PromptOperation;
use serde::{Deserialize, Serialize};

/// One model response for a file
///
/// The first attempt is the plain extraction; every later one is a
/// continuation stitched onto the previous text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionAttempt {
    /// Text as received (after stitching, for continuations)
    pub raw_response_text: String,
    /// Parsed object, when the text was structurally valid
    pub parsed_record: Option<serde_json::Value>,
    /// Whether the text failed to parse as a complete document
    pub truncated: bool,
}

impl ExtractionAttempt {
    /// Attempt whose text parsed
    pub fn parsed(raw: impl Into<String>, record: serde_json::Value) -> Self {
        Self {
            raw_response_text: raw.into(),
            parsed_record: Some(record),
            truncated: false,
        }
    }

    /// Attempt whose text did not parse
    pub fn truncated(raw: impl Into<String>) -> Self {
        Self {
            raw_response_text: raw.into(),
            parsed_record: None,
            truncated: true,
        }
    }
}

/// Identifying attribute of the last complete list element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// Attribute name, e.g. `subsequentBalance`
    pub attribute: String,
    /// Literal value as it appeared in the text, unquoted
    pub value: String,
}

/// Where a truncated response should resume
///
/// Anchors only ever come from elements whose closing brace was received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairContext {
    /// Name of the list that was being filled
    pub array_path: String,
    /// Anchors of its last complete element; empty when the list has none
    pub last_complete_element_anchor: Vec<Anchor>,
    /// Template to build the continuation request from
    pub continuation_template_ref: PromptOperation,
}

impl RepairContext {
    /// Whether the continuation should start at the first element
    pub fn from_beginning(&self) -> bool {
        self.continuation_template_ref == PromptOperation::ReprocessWithoutContext
    }
}
