//! Document categories recognised by the classifier

use serde::{Deserialize, Serialize};

/// Label the classifier returns when a document fits no known category
pub const UNCATEGORIZED: &str = "uncategorized";

/// Requested type meaning "accept whatever the classifier decides"
pub const ANY_REQUESTED: &str = "any";

/// Document category
///
/// The label of each variant is what the external model is asked to
/// answer with during classification, and what prompt template files
/// are named after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocType {
    /// Curriculum vitae
    #[serde(rename = "CV")]
    Cv,
    /// Supplier invoice
    Invoice,
    /// National identity card
    IdCard,
    /// Purchase order
    PurchaseOrder,
    /// Bank account statement with movement and trust listings
    BankStatement,
    /// Beneficial ownership registry form
    Rub,
    /// Tax registry form
    Rut,
    /// Chamber of commerce existence certificate
    CompanyExistence,
    /// Payment receipt
    Payment,
    /// Exported email
    Email,
    /// Fiduciary balance report with per-account details
    #[serde(rename = "Balance_Fiduciary")]
    FiduciaryBalance,
}

impl DocType {
    /// Every known category, in classification prompt order
    pub const ALL: [DocType; 11] = [
        DocType::Cv,
        DocType::Invoice,
        DocType::IdCard,
        DocType::PurchaseOrder,
        DocType::BankStatement,
        DocType::Rub,
        DocType::Rut,
        DocType::CompanyExistence,
        DocType::Payment,
        DocType::Email,
        DocType::FiduciaryBalance,
    ];

    /// Get the category label
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Cv => "CV",
            DocType::Invoice => "Invoice",
            DocType::IdCard => "IdCard",
            DocType::PurchaseOrder => "PurchaseOrder",
            DocType::BankStatement => "BankStatement",
            DocType::Rub => "Rub",
            DocType::Rut => "Rut",
            DocType::CompanyExistence => "CompanyExistence",
            DocType::Payment => "Payment",
            DocType::Email => "Email",
            DocType::FiduciaryBalance => "Balance_Fiduciary",
        }
    }

    /// Parse a label, ignoring case and surrounding whitespace or quotes
    ///
    /// Returns `None` for [`UNCATEGORIZED`] and anything unknown.
    pub fn parse(label: &str) -> Option<Self> {
        let cleaned = label.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`').trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(cleaned))
    }

    /// Family name: the label up to its first underscore
    ///
    /// `Balance_Fiduciary` belongs to the `Balance` family; labels without
    /// an underscore are their own family.
    pub fn family(&self) -> &'static str {
        family_of(self.as_str())
    }

    /// Whether this classification is acceptable for the requested type
    ///
    /// Exact matches and shared-family matches are accepted, and
    /// [`ANY_REQUESTED`] accepts everything. Callers only log a
    /// non-match; it never fails a file.
    pub fn matches_request(&self, requested: &str) -> bool {
        let requested = requested.trim();
        if requested.eq_ignore_ascii_case(ANY_REQUESTED) {
            return true;
        }
        if self.as_str().eq_ignore_ascii_case(requested) {
            return true;
        }
        self.family().eq_ignore_ascii_case(family_of(requested))
    }
}

fn family_of(label: &str) -> &str {
    label.split('_').next().unwrap_or(label)
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid document type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(DocType::parse("invoice"), Some(DocType::Invoice));
        assert_eq!(DocType::parse("  BANKSTATEMENT\n"), Some(DocType::BankStatement));
        assert_eq!(DocType::parse("\"CV\""), Some(DocType::Cv));
        assert_eq!(DocType::parse(UNCATEGORIZED), None);
        assert_eq!(DocType::parse("Recipe"), None);
    }

    #[test]
    fn test_labels_round_trip() {
        for t in DocType::ALL {
            assert_eq!(DocType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_family() {
        assert_eq!(DocType::FiduciaryBalance.family(), "Balance");
        assert_eq!(DocType::Invoice.family(), "Invoice");
    }

    #[test]
    fn test_matches_request() {
        assert!(DocType::Invoice.matches_request("Invoice"));
        assert!(DocType::Invoice.matches_request("invoice"));
        assert!(DocType::Invoice.matches_request("any"));
        assert!(DocType::FiduciaryBalance.matches_request("Balance"));
        assert!(DocType::FiduciaryBalance.matches_request("Balance_Bank"));
        assert!(!DocType::Invoice.matches_request("Payment"));
        assert!(!DocType::Rut.matches_request("Rub"));
    }
}
