//! Per-document-type configuration
//!
//! The registry is built once at startup and handed to the orchestrator
//! and the scoring engine explicitly. Nothing reads it through globals.

use crate::{DocType, DomainError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Operation a prompt template is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptOperation {
    /// Initial field extraction
    Extraction,
    /// Field-by-field audit of an extracted record
    Audit,
    /// Continue a list after the anchored element
    ReprocessWithContext,
    /// Restart a list that had no complete element
    ReprocessWithoutContext,
}

impl PromptOperation {
    /// Every operation a document type may need a template for
    pub const ALL: [PromptOperation; 4] = [
        PromptOperation::Extraction,
        PromptOperation::Audit,
        PromptOperation::ReprocessWithContext,
        PromptOperation::ReprocessWithoutContext,
    ];

    /// Name used in template file names
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptOperation::Extraction => "extraction",
            PromptOperation::Audit => "audit",
            PromptOperation::ReprocessWithContext => "reprocess-with-context",
            PromptOperation::ReprocessWithoutContext => "reprocess-without-context",
        }
    }

    /// Whether the operation belongs to truncation repair
    pub fn is_repair(&self) -> bool {
        matches!(
            self,
            PromptOperation::ReprocessWithContext | PromptOperation::ReprocessWithoutContext
        )
    }
}

impl std::fmt::Display for PromptOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a document type turns an audit into a score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum ScoringScheme {
    /// Weighted mean of per-field audit values, in `0..=1`
    Weighted {
        /// Field name and weight, in report order
        weights: Vec<(String, f64)>,
    },
    /// Share of required fields present, in `0..=100`
    Presence {
        /// Required field names, in report order
        required: Vec<String>,
    },
}

impl ScoringScheme {
    /// Weighted scheme from borrowed pairs
    pub fn weighted(weights: &[(&str, f64)]) -> Self {
        ScoringScheme::Weighted {
            weights: weights.iter().map(|(k, w)| (k.to_string(), *w)).collect(),
        }
    }

    /// Presence scheme from borrowed names
    pub fn presence(required: &[&str]) -> Self {
        ScoringScheme::Presence {
            required: required.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Upper bound of the score range
    pub fn scale(&self) -> f64 {
        match self {
            ScoringScheme::Weighted { .. } => 1.0,
            ScoringScheme::Presence { .. } => 100.0,
        }
    }
}

/// A list field that may be cut off mid-fill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSpec {
    /// Key of the list in the record
    pub name: String,
    /// Attributes that identify an element (one or two)
    pub anchors: Vec<String>,
}

impl ListSpec {
    /// Create a list spec
    pub fn new(name: &str, anchors: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            anchors: anchors.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Truncation repair settings for a document type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairProfile {
    /// Repairable lists, in schema order; all are required in the record
    pub lists: Vec<ListSpec>,
    /// Maximum continuation requests per file
    pub budget: u32,
}

impl RepairProfile {
    /// Look up a list by name
    pub fn list(&self, name: &str) -> Option<&ListSpec> {
        self.lists.iter().find(|l| l.name == name)
    }
}

/// Everything the pipeline knows about one document type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocTypeProfile {
    /// Which type this describes
    pub doc_type: DocType,
    /// One-line description shown to the classifier
    pub description: String,
    /// Scoring scheme
    pub scoring: ScoringScheme,
    /// Repair settings; `None` means truncated responses fail immediately
    pub repair: Option<RepairProfile>,
}

/// Immutable lookup table of [`DocTypeProfile`]s
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocTypeRegistry {
    profiles: BTreeMap<DocType, DocTypeProfile>,
}

impl DocTypeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a profile
    pub fn with_profile(mut self, profile: DocTypeProfile) -> Self {
        self.profiles.insert(profile.doc_type, profile);
        self
    }

    /// Profile for a type
    pub fn get(&self, doc_type: DocType) -> Result<&DocTypeProfile, DomainError> {
        self.profiles
            .get(&doc_type)
            .ok_or_else(|| DomainError::UnknownDocType(doc_type.to_string()))
    }

    /// All registered types, in label order
    pub fn doc_types(&self) -> impl Iterator<Item = DocType> + '_ {
        self.profiles.keys().copied()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no type is registered
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// `- label: description` lines for the classification prompt
    pub fn category_descriptions(&self) -> String {
        self.profiles
            .values()
            .map(|p| format!("- {}: {}", p.doc_type, p.description))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The production table of every known document type
    pub fn builtin() -> Self {
        let entries = [
            profile(
                DocType::Cv,
                "Resume or curriculum vitae describing a person's education, experience and skills",
                ScoringScheme::weighted(&[
                    ("full_name", 2.0),
                    ("contact_info", 2.0),
                    ("profile_description", 2.0),
                    ("education_list", 2.0),
                    ("document_type", 1.0),
                    ("identity_document", 1.0),
                    ("full_address", 1.0),
                    ("experience_list", 1.0),
                    ("skills_list", 1.0),
                    ("languages_list", 1.0),
                ]),
                None,
            ),
            profile(
                DocType::Invoice,
                "Invoice issued by a supplier with tax id, dates, totals and product lines",
                ScoringScheme::weighted(&[
                    ("nit", 4.0),
                    ("billExpeditionDate", 2.0),
                    ("billExpirationDate", 1.0),
                    ("supplierName", 1.0),
                    ("totalAmount", 1.0),
                    ("totalTaxAmount", 1.0),
                    ("netAmount", 1.0),
                ]),
                None,
            ),
            profile(
                DocType::IdCard,
                "National identity card of a person, front and/or back",
                ScoringScheme::weighted(&[
                    ("document_type", 4.0),
                    ("id_number", 4.0),
                    ("last_names", 3.0),
                    ("names", 3.0),
                    ("birth_date", 3.0),
                    ("birth_place", 3.0),
                    ("sex", 2.0),
                    ("expedition_date", 1.0),
                    ("expedition_place", 1.0),
                    ("height", 1.0),
                    ("blood_type", 1.0),
                ]),
                None,
            ),
            profile(
                DocType::PurchaseOrder,
                "Purchase order between a buyer and a provider with item lines",
                ScoringScheme::weighted(&[
                    ("order_number", 4.0),
                    ("issue_date", 3.0),
                    ("buyer_name", 3.0),
                    ("provider_name", 3.0),
                    ("total", 3.0),
                    ("items_list", 2.0),
                    ("currency", 2.0),
                    ("buyer_id", 2.0),
                    ("provider_id", 2.0),
                    ("subtotal", 1.0),
                    ("taxes", 1.0),
                    ("discounts", 1.0),
                ]),
                None,
            ),
            profile(
                DocType::BankStatement,
                "Bank account statement listing movements and trust accounts for a period",
                ScoringScheme::weighted(&[
                    ("bank_name", 4.0),
                    ("holder_name", 4.0),
                    ("account_number", 4.0),
                    ("period_start_date", 3.0),
                    ("period_end_date", 3.0),
                    ("current_balance", 3.0),
                    ("movements_list", 2.0),
                    ("currency", 2.0),
                    ("account_type", 2.0),
                    ("previous_balance", 2.0),
                    ("total_deposits", 2.0),
                    ("total_withdrawals", 2.0),
                    ("client_number", 1.0),
                    ("total_commissions", 1.0),
                    ("statement_issue_date", 1.0),
                ]),
                Some(RepairProfile {
                    lists: vec![
                        ListSpec::new("movements", &["value", "subsequentBalance"]),
                        ListSpec::new("trusts", &["trustName", "trustDate"]),
                    ],
                    budget: 4,
                }),
            ),
            profile(
                DocType::Rub,
                "Beneficial ownership registry form listing final beneficiaries of a company",
                ScoringScheme::weighted(&[
                    ("company_name", 4.0),
                    ("nit", 4.0),
                    ("report_date", 3.0),
                    ("legal_representative_name", 3.0),
                    ("legal_representative_surname", 3.0),
                    ("legal_representative_document_type", 3.0),
                    ("legal_representative_document_number", 3.0),
                    ("beneficiaries_list", 3.0),
                    ("dv", 2.0),
                    ("entity_type", 2.0),
                    ("address", 2.0),
                    ("declaration_date", 1.0),
                    ("declarant", 1.0),
                    ("position", 1.0),
                ]),
                None,
            ),
            profile(
                DocType::Rut,
                "Tax registry form with economic activities, establishments and responsibilities",
                ScoringScheme::weighted(&[
                    ("document_type", 4.0),
                    ("document_number", 4.0),
                    ("dv", 3.0),
                    ("expedition_date", 3.0),
                    ("rut_status", 3.0),
                    ("economic_activities_list", 3.0),
                    ("company_or_person_name", 2.0),
                    ("address", 2.0),
                    ("activity_start_date", 2.0),
                    ("responsibilities_list", 2.0),
                    ("legal_representative_info", 2.0),
                    ("regime", 1.0),
                    ("contributor_type", 1.0),
                ]),
                None,
            ),
            profile(
                DocType::CompanyExistence,
                "Chamber of commerce certificate of existence and legal representation",
                ScoringScheme::Weighted { weights: Vec::new() },
                None,
            ),
            profile(
                DocType::Payment,
                "Payment receipt or transfer voucher between two bank accounts",
                ScoringScheme::presence(&[
                    "payment_date",
                    "payment_value",
                    "payment_reference",
                    "receiver_name",
                    "document_type",
                    "document_number",
                    "source_bank",
                    "source_account",
                    "target_bank",
                    "target_account",
                    "payment_method",
                    "concept",
                ]),
                None,
            ),
            profile(
                DocType::Email,
                "Printed or exported email message with sender, subject and body",
                ScoringScheme::presence(&["email", "subject", "body", "date", "attachment_count"]),
                None,
            ),
            profile(
                DocType::FiduciaryBalance,
                "Fiduciary balance report with totals and one detail line per account or order",
                ScoringScheme::presence(&[
                    "bank_name",
                    "balance_date",
                    "total_orders",
                    "total_orders_exchange",
                    "total_orders_available",
                    "total_accounts",
                    "total_accounts_exchange",
                    "total_accounts_available",
                ]),
                Some(RepairProfile {
                    lists: vec![ListSpec::new("details", &["accountNumber"])],
                    budget: 6,
                }),
            ),
        ];

        entries
            .into_iter()
            .fold(Self::new(), |registry, p| registry.with_profile(p))
    }
}

fn profile(
    doc_type: DocType,
    description: &str,
    scoring: ScoringScheme,
    repair: Option<RepairProfile>,
) -> DocTypeProfile {
    DocTypeProfile {
        doc_type,
        description: description.to_string(),
        scoring,
        repair,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_type() {
        let registry = DocTypeRegistry::builtin();
        assert_eq!(registry.len(), DocType::ALL.len());
        for t in DocType::ALL {
            assert!(registry.get(t).is_ok(), "missing {}", t);
        }
    }

    #[test]
    fn test_repair_budgets() {
        let registry = DocTypeRegistry::builtin();
        let statement = registry.get(DocType::BankStatement).unwrap();
        let repair = statement.repair.as_ref().unwrap();
        assert_eq!(repair.budget, 4);
        assert_eq!(repair.list("trusts").unwrap().anchors, vec!["trustName", "trustDate"]);

        let balance = registry.get(DocType::FiduciaryBalance).unwrap();
        assert_eq!(balance.repair.as_ref().unwrap().budget, 6);

        assert!(registry.get(DocType::Invoice).unwrap().repair.is_none());
    }

    #[test]
    fn test_category_descriptions() {
        let registry = DocTypeRegistry::new().with_profile(profile(
            DocType::Email,
            "An email",
            ScoringScheme::presence(&["email"]),
            None,
        ));
        assert_eq!(registry.category_descriptions(), "- Email: An email");
        assert!(registry.get(DocType::Cv).is_err());
    }
}
