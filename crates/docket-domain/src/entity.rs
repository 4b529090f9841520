//! Typed document records
//!
//! One struct per [`DocType`], joined in the [`DocumentEntity`] tagged
//! union. Every scalar is optional and parsed leniently; lists default to
//! empty and silently drop elements that do not fit the shape.

use crate::lenient;
use crate::DocType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Typed record, tagged by document type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "docType")]
pub enum DocumentEntity {
    /// Curriculum vitae
    #[serde(rename = "CV")]
    Cv(Cv),
    /// Supplier invoice
    Invoice(Invoice),
    /// Identity card
    IdCard(IdCard),
    /// Purchase order
    PurchaseOrder(PurchaseOrder),
    /// Bank statement
    BankStatement(BankStatement),
    /// Beneficial ownership form
    Rub(Rub),
    /// Tax registry form
    Rut(Rut),
    /// Existence certificate
    CompanyExistence(CompanyExistence),
    /// Payment receipt
    Payment(Payment),
    /// Email
    Email(Email),
    /// Fiduciary balance
    #[serde(rename = "Balance_Fiduciary")]
    FiduciaryBalance(Balance),
}

impl DocumentEntity {
    /// Validate a parsed record against the shape for `doc_type`
    ///
    /// # Errors
    ///
    /// Fails only when the record is not a JSON object; individual fields
    /// that do not fit are dropped.
    pub fn from_record(doc_type: DocType, record: Value) -> Result<Self, serde_json::Error> {
        Ok(match doc_type {
            DocType::Cv => DocumentEntity::Cv(serde_json::from_value(record)?),
            DocType::Invoice => DocumentEntity::Invoice(serde_json::from_value(record)?),
            DocType::IdCard => DocumentEntity::IdCard(serde_json::from_value(record)?),
            DocType::PurchaseOrder => {
                DocumentEntity::PurchaseOrder(serde_json::from_value(record)?)
            }
            DocType::BankStatement => {
                DocumentEntity::BankStatement(serde_json::from_value(record)?)
            }
            DocType::Rub => DocumentEntity::Rub(serde_json::from_value(record)?),
            DocType::Rut => DocumentEntity::Rut(serde_json::from_value(record)?),
            DocType::CompanyExistence => {
                DocumentEntity::CompanyExistence(serde_json::from_value(record)?)
            }
            DocType::Payment => DocumentEntity::Payment(serde_json::from_value(record)?),
            DocType::Email => DocumentEntity::Email(serde_json::from_value(record)?),
            DocType::FiduciaryBalance => {
                DocumentEntity::FiduciaryBalance(serde_json::from_value(record)?)
            }
        })
    }

    /// Tag of this record
    pub fn doc_type(&self) -> DocType {
        match self {
            DocumentEntity::Cv(_) => DocType::Cv,
            DocumentEntity::Invoice(_) => DocType::Invoice,
            DocumentEntity::IdCard(_) => DocType::IdCard,
            DocumentEntity::PurchaseOrder(_) => DocType::PurchaseOrder,
            DocumentEntity::BankStatement(_) => DocType::BankStatement,
            DocumentEntity::Rub(_) => DocType::Rub,
            DocumentEntity::Rut(_) => DocType::Rut,
            DocumentEntity::CompanyExistence(_) => DocType::CompanyExistence,
            DocumentEntity::Payment(_) => DocType::Payment,
            DocumentEntity::Email(_) => DocType::Email,
            DocumentEntity::FiduciaryBalance(_) => DocType::FiduciaryBalance,
        }
    }

    /// Fill in type-specific defaults that depend on the file itself
    ///
    /// Balance reports without a balance date take it from a `YYYYMMDD`
    /// file name prefix.
    pub fn complete_from_file_name(&mut self, file_name: &str) {
        if let DocumentEntity::FiduciaryBalance(balance) = self {
            if balance.balance_date.is_none() {
                balance.balance_date = date_from_file_name(file_name);
            }
        }
    }
}

/// Date encoded in the first eight characters of a file name (`YYYYMMDD`)
pub fn date_from_file_name(file_name: &str) -> Option<NaiveDate> {
    let prefix = file_name.get(..8)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(prefix, "%Y%m%d").ok()
}

/// Curriculum vitae
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cv {
    #[serde(default, deserialize_with = "lenient::text")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub tel: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub full_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub abilities: Vec<CvAbility>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub education: Vec<CvEducation>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub experiences: Vec<CvExperience>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub languages: Vec<CvLanguage>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvAbility {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvLanguage {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub level: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub test: Option<String>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvEducation {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub place: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, rename = "type", deserialize_with = "lenient::text")]
    pub kind: Option<String>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvExperience {
    #[serde(default, deserialize_with = "lenient::text")]
    pub job_position: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
}

/// Supplier invoice
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default, deserialize_with = "lenient::text")]
    pub nit: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub bill_expedition_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub bill_expiration_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub supplier_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_tax_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub net_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub products: Vec<InvoiceProduct>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceProduct {
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub unit_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub product_id: Option<String>,
}

/// Identity card
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdCard {
    #[serde(default, deserialize_with = "lenient::text")]
    pub document_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub number: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_names: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub names: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub birthday: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub birth_place: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub expedition_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub expedition_place: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub blood_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub sex: Option<String>,
}

/// Purchase order
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    #[serde(default, deserialize_with = "lenient::text")]
    pub order_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub buyer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub buyer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub provider_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub provider_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub sub_total: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub taxes: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub discounts: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub delivery_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub items: Vec<PurchaseOrderItem>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub measure_unit: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub unitary_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub sub_total: Option<f64>,
}

/// Bank statement
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankStatement {
    #[serde(default, deserialize_with = "lenient::text")]
    pub bank_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub holder_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub client_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub account_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub account_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub start_date_period: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub end_date_period: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub previous_balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub actual_balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_deposits: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_withdrawals: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_commissions: Option<f64>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub statement_issue_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub movements: Vec<StatementMovement>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub trusts: Vec<StatementTrust>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementMovement {
    #[serde(default, deserialize_with = "lenient::date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub reference: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub value: Option<f64>,
    #[serde(default, rename = "type", deserialize_with = "lenient::text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub subsequent_balance: Option<f64>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementTrust {
    #[serde(default, deserialize_with = "lenient::text")]
    pub trust_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub trust_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub trust_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub concept: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub movements: Vec<StatementMovement>,
}

/// Beneficial ownership registry form
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rub {
    #[serde(default, deserialize_with = "lenient::text")]
    pub form_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub reporting_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub nit: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dv: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub entity_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub legal_representative_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub legal_representative_document_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub declarant: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub declaration_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub beneficiaries: Vec<RubBeneficiary>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubBeneficiary {
    #[serde(default, deserialize_with = "lenient::text")]
    pub person_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub surname: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub document_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub document_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub nationality: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub participation_percentage: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub start_date: Option<NaiveDate>,
}

/// Tax registry form
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rut {
    #[serde(default, deserialize_with = "lenient::text")]
    pub form_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub expedition_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub document_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub document_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dv: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub contributor_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub regime: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub activity_start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub rut_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub activities: Vec<RutActivity>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub responsibilities: Vec<RutResponsibility>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RutActivity {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub ciiu_code: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub start_date: Option<NaiveDate>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RutResponsibility {
    #[serde(default, deserialize_with = "lenient::text")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
}

/// Existence certificate
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyExistence {
    #[serde(default, deserialize_with = "lenient::date")]
    pub expedition_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub social: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub nit: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub legal_organization: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub constitution_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub main_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_assets: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub enrollment_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub legal_representatives: Vec<ExistenceRepresentative>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub partners: Vec<ExistencePartner>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistenceRepresentative {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub id_number: Option<String>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistencePartner {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub id_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub participation_percent: Option<f64>,
}

/// Payment receipt
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default, deserialize_with = "lenient::date")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub beneficiary_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub payment_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub reference_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub bank: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub beneficiary_account: Option<String>,
}

/// Email
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub attachment_count: Option<i64>,
}

/// Fiduciary balance report
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde(default, deserialize_with = "lenient::text")]
    pub bank_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub bank_nit: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub account_holder: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub balance_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_orders: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_orders_exchange: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_orders_available: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_accounts: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_accounts_exchange: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_accounts_available: Option<f64>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub details: Vec<BalanceDetail>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDetail {
    #[serde(default, deserialize_with = "lenient::text")]
    pub account_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub account_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub exchange_balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub available_balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub participation: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fund: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub date: Option<NaiveDate>,
}
