//! Scoring engine

use crate::{AuditReport, ScoringError};
use docket_domain::{DocType, DocTypeRegistry, ScoreResult, ScoringScheme};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Computes scores with the scheme each document type is registered with
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    registry: Arc<DocTypeRegistry>,
}

impl ScoringEngine {
    /// Create an engine over a registry
    pub fn new(registry: Arc<DocTypeRegistry>) -> Self {
        Self { registry }
    }

    /// Score an audit map for a document type
    ///
    /// Returns the score and the scheme's explanation.
    ///
    /// # Errors
    ///
    /// `Registry` when the type is not registered.
    pub fn score(
        &self,
        doc_type: DocType,
        audit: &Map<String, Value>,
    ) -> Result<(f64, String), ScoringError> {
        let profile = self.registry.get(doc_type)?;
        Ok(match &profile.scoring {
            ScoringScheme::Weighted { weights } => weighted(doc_type, weights, audit),
            ScoringScheme::Presence { required } => presence(required, audit),
        })
    }

    /// Full score result for an audit report
    ///
    /// The explanation is the auditor's reasoning followed by the scheme's,
    /// separated by ` | `.
    pub fn evaluate(
        &self,
        doc_type: DocType,
        report: &AuditReport,
    ) -> Result<ScoreResult, ScoringError> {
        let (score, scheme_explanation) = self.score(doc_type, &report.scores)?;
        let explanation = if report.explanation.trim().is_empty() {
            scheme_explanation
        } else {
            format!("{} | {}", report.explanation.trim(), scheme_explanation)
        };
        Ok(ScoreResult {
            score,
            explanation,
            field_issues: report.field_issues(),
        })
    }

    /// Score to use when the record could not be audited
    ///
    /// `fallback` is on the weighted `0..=1` scale and is rescaled for
    /// presence types.
    pub fn fallback(
        &self,
        doc_type: DocType,
        fallback: f64,
        reason: &str,
    ) -> Result<ScoreResult, ScoringError> {
        let profile = self.registry.get(doc_type)?;
        Ok(ScoreResult {
            score: fallback * profile.scoring.scale(),
            explanation: format!(
                "Record could not be audited ({}); score assigned automatically",
                reason
            ),
            field_issues: BTreeMap::new(),
        })
    }
}

fn weighted(
    doc_type: DocType,
    weights: &[(String, f64)],
    audit: &Map<String, Value>,
) -> (f64, String) {
    let mut total_score = 0.0;
    let mut total_weight = 0.0;

    for (field, weight) in weights {
        let value = match audit.get(field) {
            None => 0.0,
            Some(v) => v.as_f64().unwrap_or_else(|| {
                warn!("Non-numeric audit value for {}.{}: {}; using 0", doc_type, field, v);
                0.0
            }),
        };
        total_score += value * weight;
        total_weight += weight;
    }

    if total_weight == 0.0 {
        return (0.0, "No weighted fields configured".to_string());
    }

    let score = (total_score / total_weight).clamp(0.0, 1.0);
    (score, format!("Weighted audit over {} fields", weights.len()))
}

fn presence(required: &[String], audit: &Map<String, Value>) -> (f64, String) {
    if required.is_empty() {
        return (0.0, "No required fields configured".to_string());
    }

    let missing: Vec<&str> = required
        .iter()
        .filter(|f| !audit.get(f.as_str()).is_some_and(is_present))
        .map(String::as_str)
        .collect();
    let present = required.len() - missing.len();
    let score = (100 * present / required.len()) as f64;

    let explanation = if missing.is_empty() {
        "All required fields are complete.".to_string()
    } else {
        format!("Missing fields: {}.", missing.join(", "))
    };
    (score, explanation)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_domain::DocTypeProfile;
    use proptest::prelude::*;
    use serde_json::json;

    fn engine_with(scoring: ScoringScheme) -> ScoringEngine {
        let registry = DocTypeRegistry::new().with_profile(DocTypeProfile {
            doc_type: DocType::Invoice,
            description: "test".to_string(),
            scoring,
            repair: None,
        });
        ScoringEngine::new(Arc::new(registry))
    }

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_weighted_mean() {
        let engine = engine_with(ScoringScheme::weighted(&[("a", 2.0), ("b", 1.0)]));
        let (score, _) = engine.score(DocType::Invoice, &map(json!({"a": 1, "b": 0}))).unwrap();
        assert!((score - 0.667).abs() < 0.001);
    }

    #[test]
    fn test_empty_weights_score_zero() {
        let engine = engine_with(ScoringScheme::Weighted { weights: Vec::new() });
        let (score, _) = engine.score(DocType::Invoice, &map(json!({"a": 1}))).unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_missing_and_non_numeric_count_as_zero() {
        let engine = engine_with(ScoringScheme::weighted(&[("a", 1.0), ("b", 1.0), ("c", 2.0)]));
        let (score, _) = engine
            .score(DocType::Invoice, &map(json!({"a": 1, "b": "high"})))
            .unwrap();
        assert_eq!(score, 0.25);
    }

    #[test]
    fn test_weighted_is_clamped() {
        let engine = engine_with(ScoringScheme::weighted(&[("a", 1.0)]));
        let (score, _) = engine.score(DocType::Invoice, &map(json!({"a": 7}))).unwrap();
        assert_eq!(score, 1.0);
        let (score, _) = engine.score(DocType::Invoice, &map(json!({"a": -3}))).unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_presence_names_missing_fields() {
        let engine = engine_with(ScoringScheme::presence(&["a", "b", "c", "d", "e"]));
        let (score, explanation) = engine
            .score(DocType::Invoice, &map(json!({"a": 1, "b": "x", "c": true, "d": "", "e": null})))
            .unwrap();
        assert_eq!(score, 60.0);
        assert_eq!(explanation, "Missing fields: d, e.");
    }

    #[test]
    fn test_presence_complete() {
        let engine = engine_with(ScoringScheme::presence(&["a"]));
        let (score, explanation) = engine.score(DocType::Invoice, &map(json!({"a": [1]}))).unwrap();
        assert_eq!(score, 100.0);
        assert!(explanation.contains("complete"));
    }

    #[test]
    fn test_presence_rounds_down() {
        let engine = engine_with(ScoringScheme::presence(&["a", "b", "c"]));
        let (score, _) = engine.score(DocType::Invoice, &map(json!({"a": 1}))).unwrap();
        assert_eq!(score, 33.0);
    }

    #[test]
    fn test_unknown_type() {
        let engine = engine_with(ScoringScheme::presence(&["a"]));
        assert!(matches!(
            engine.score(DocType::Cv, &Map::new()),
            Err(ScoringError::Registry(_))
        ));
    }

    #[test]
    fn test_evaluate_joins_explanations() {
        let engine = engine_with(ScoringScheme::weighted(&[("nit", 1.0)]));
        let report = AuditReport::from_value(json!({
            "scores": {"nit": 0.5},
            "explanation": "nit has a smudged digit"
        }))
        .unwrap();
        let result = engine.evaluate(DocType::Invoice, &report).unwrap();
        assert_eq!(result.score, 0.5);
        assert_eq!(result.explanation, "nit has a smudged digit | Weighted audit over 1 fields");
        assert_eq!(result.field_issues["nit"].as_deref(), Some("nit has a smudged digit"));
    }

    #[test]
    fn test_fallback_scales_per_scheme() {
        let weighted = engine_with(ScoringScheme::weighted(&[("a", 1.0)]));
        assert_eq!(weighted.fallback(DocType::Invoice, 0.7, "timeout").unwrap().score, 0.7);

        let presence = engine_with(ScoringScheme::presence(&["a"]));
        let result = presence.fallback(DocType::Invoice, 0.7, "timeout").unwrap();
        assert!((result.score - 70.0).abs() < 1e-9);
        assert!(result.explanation.contains("timeout"));
    }

    #[test]
    fn test_builtin_weighted_types_stay_in_range() {
        let engine = ScoringEngine::new(Arc::new(DocTypeRegistry::builtin()));
        let (score, _) = engine
            .score(DocType::BankStatement, &map(json!({"bank_name": 1, "holder_name": 0.5})))
            .unwrap();
        assert!(score > 0.0 && score < 1.0);
        let (score, _) = engine.score(DocType::CompanyExistence, &map(json!({"x": 1}))).unwrap();
        assert_eq!(score, 0.0);
    }

    proptest! {
        #[test]
        fn weighted_score_is_bounded(values in proptest::collection::vec(-5.0f64..5.0, 3)) {
            let scheme = ScoringScheme::weighted(&[("a", 3.0), ("b", 2.0), ("c", 1.0)]);
            let engine = engine_with(scheme);
            let audit = map(json!({"a": values[0], "b": values[1], "c": values[2]}));
            let (score, _) = engine.score(DocType::Invoice, &audit).unwrap();
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
