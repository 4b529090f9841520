//! Audit responses

use crate::ScoringError;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Parsed answer to an audit prompt
///
/// `scores` maps field names to the auditor's confidence, normally in
/// `0..=1`. Values are kept as raw JSON; the engine coerces them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Per-field audit values
    #[serde(default)]
    pub scores: Map<String, Value>,
    /// Free-text reasoning
    #[serde(default)]
    pub explanation: String,
}

impl AuditReport {
    /// Read a report out of an already-parsed response
    pub fn from_value(value: Value) -> Result<Self, ScoringError> {
        if !value.is_object() {
            return Err(ScoringError::InvalidAudit(
                "expected a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| ScoringError::InvalidAudit(e.to_string()))
    }

    /// Fields audited below 1, with the explanation fragment naming each
    ///
    /// The fragment starts at the field name (case-insensitive) and runs to
    /// the next `.`, `,`, `;` or newline. Fields the explanation never
    /// mentions map to `None`.
    pub fn field_issues(&self) -> BTreeMap<String, Option<String>> {
        self.scores
            .iter()
            .filter(|(_, v)| v.as_f64().is_some_and(|s| s < 1.0))
            .map(|(field, _)| (field.clone(), self.remark_for(field)))
            .collect()
    }

    fn remark_for(&self, field: &str) -> Option<String> {
        let pattern = format!("({}[^.,;\\n]*)", regex::escape(field));
        let re = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .ok()?;
        re.captures(&self.explanation)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    }
}
