use crate::period::{PeriodPatterns, PeriodRange, YearMonth};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two supported entity categories. A batch belongs to exactly one
/// category; the department and receipt-refinement rules differ between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityKind {
    #[schemars(description = "Marketplace entity; department codes are truncated directly")]
    Mob,

    #[schemars(
        description = "Support entity; department codes depend on the account code's leading digit"
    )]
    Spt,
}

/// Which shape of line item a batch carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Pr,
    Po,
}

/// Accrual status of a line item.
///
/// Statuses assigned upstream (closing lists, working papers, manual edits)
/// are immutable once set; free-text values round-trip through `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    /// The description matched none of the configured period shapes.
    FormatError,
    /// Delivery window brackets the expected-receive month, which has passed.
    Completed,
    /// Delivery window brackets the expected-receive month, which is ahead.
    Incomplete,
    /// The declared delivery window does not bracket the expected-receive
    /// month.
    OutOfRange,
    /// The order appears on a closing list.
    PendingClose,
    /// The PO line is already fully invoiced.
    Booked,
    /// The PR line is payroll-tagged and handled outside this process.
    Payroll,
    /// The PR description carries a configured no-estimate keyword.
    NotEstimated,
    /// Receipt complete although the expected-receive month is out of the
    /// declared window.
    CompletedErm,
    /// Receipt started but short of the entry quantity, out of window.
    PartialErm,
    /// Nothing received, out of window.
    IncompleteErm,
    /// Fully paid but the order was never closed; needs review.
    PaidNotClosed,
    /// Quantities disagree; the receipt needs review.
    CheckReceipt,
    /// Goods arrived before the expected-receive month; needs review.
    EarlyComplete,
    /// Any other value supplied by a user.
    Custom(String),
}

impl Status {
    pub fn as_label(&self) -> &str {
        match self {
            Status::FormatError => "Format Error",
            Status::Completed => "Completed",
            Status::Incomplete => "Incomplete",
            Status::OutOfRange => "Period Out of ERM",
            Status::PendingClose => "Pending Close",
            Status::Booked => "Booked",
            Status::Payroll => "Payroll",
            Status::NotEstimated => "Not Estimated",
            Status::CompletedErm => "Completed ERM",
            Status::PartialErm => "Partially Completed ERM",
            Status::IncompleteErm => "Incomplete ERM",
            Status::PaidNotClosed => "Fully Paid, Not Closed",
            Status::CheckReceipt => "Check Receipt",
            Status::EarlyComplete => "Early Completion",
            Status::Custom(text) => text,
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Format Error" => Status::FormatError,
            "Completed" => Status::Completed,
            "Incomplete" => Status::Incomplete,
            "Period Out of ERM" => Status::OutOfRange,
            "Pending Close" => Status::PendingClose,
            "Booked" => Status::Booked,
            "Payroll" => Status::Payroll,
            "Not Estimated" => Status::NotEstimated,
            "Completed ERM" => Status::CompletedErm,
            "Partially Completed ERM" => Status::PartialErm,
            "Incomplete ERM" => Status::IncompleteErm,
            "Fully Paid, Not Closed" => Status::PaidNotClosed,
            "Check Receipt" => Status::CheckReceipt,
            "Early Completion" => Status::EarlyComplete,
            other => Status::Custom(other.to_string()),
        }
    }
}

impl From<String> for Status {
    fn from(label: String) -> Self {
        Status::from_label(&label)
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_label().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Whether an accrual is booked for the line item. Absence of a decision is
/// `Option::None` on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccrualFlag {
    #[serde(rename = "Y")]
    Yes,
    #[serde(rename = "N")]
    No,
}

/// Outcome of comparing the project's leading token against the product code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCodeCheck {
    Good,
    Bad,
}

/// Fields shared by PR and PO line items: the raw inputs, the working fields
/// written by the period extractor, and the output fields written by the
/// classifier, the decision engine, and the field deriver.
///
/// Every output field is blank-guarded, so reprocessing a finished record is
/// a no-op.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordCore {
    pub order_id: String,
    pub line_id: String,
    pub item_description: Option<String>,
    pub expected_receive_month: Option<String>,
    pub cutoff: YearMonth,
    pub gl_account: String,
    pub department: String,
    pub currency: String,
    pub region: String,
    pub product_code: String,
    pub project: Option<String>,
    pub entry_amount: f64,
    pub procurement_remark: Option<String>,
    pub status: Option<Status>,

    #[serde(default)]
    pub description_period: Option<PeriodRange>,
    #[serde(default)]
    pub expected_period: Option<YearMonth>,

    #[serde(default)]
    pub accrual: Option<AccrualFlag>,
    #[serde(default)]
    pub account_code: Option<String>,
    #[serde(default)]
    pub fixed_asset: Option<AccrualFlag>,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub liability_account: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub department_code: Option<String>,
    #[serde(default)]
    pub accrual_currency: Option<String>,
    #[serde(default)]
    pub accrual_amount: Option<f64>,
    #[serde(default)]
    pub booked_product_code: Option<String>,
    #[serde(default)]
    pub product_code_check: Option<ProductCodeCheck>,
}

/// A purchase-request line item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrRecord {
    #[serde(flatten)]
    pub core: RecordCore,
    pub ebs_task: Option<String>,
}

/// A purchase-order line item. Carries the billing and receipt quantities the
/// PR shape lacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoRecord {
    #[serde(flatten)]
    pub core: RecordCore,
    pub entry_billed_amount: f64,
    pub entry_quantity: f64,
    pub received_quantity: f64,
    pub fully_invoiced: bool,
    pub entry_prepay_amount: f64,
    #[serde(default)]
    pub prepaid_amount: Option<f64>,
}

/// A homogeneous batch of line items. The PR/PO shape is fixed per batch and
/// dispatched once, not re-checked per field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecordBatch {
    Pr(Vec<PrRecord>),
    Po(Vec<PoRecord>),
}

impl RecordBatch {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordBatch::Pr(_) => RecordKind::Pr,
            RecordBatch::Po(_) => RecordKind::Po,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordBatch::Pr(records) => records.len(),
            RecordBatch::Po(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cores(&self) -> Box<dyn Iterator<Item = &RecordCore> + '_> {
        match self {
            RecordBatch::Pr(records) => Box::new(records.iter().map(|r| &r.core)),
            RecordBatch::Po(records) => Box::new(records.iter().map(|r| &r.core)),
        }
    }

    pub fn cores_mut(&mut self) -> Box<dyn Iterator<Item = &mut RecordCore> + '_> {
        match self {
            RecordBatch::Pr(records) => Box::new(records.iter_mut().map(|r| &mut r.core)),
            RecordBatch::Po(records) => Box::new(records.iter_mut().map(|r| &mut r.core)),
        }
    }
}

/// Configuration for one engine instance, passed explicitly to the entry
/// point. `for_entity` supplies the production defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EngineConfig {
    #[schemars(description = "Entity category the batch belongs to")]
    pub entity: EntityKind,

    #[serde(default)]
    #[schemars(description = "Regular-expression shapes for delivery periods in descriptions")]
    pub patterns: PeriodPatterns,

    #[serde(default = "default_fixed_asset_accounts")]
    #[schemars(description = "GL account codes treated as fixed-asset accounts for this entity")]
    pub fixed_asset_accounts: Vec<String>,

    #[serde(default)]
    #[schemars(
        description = "Description keywords that mark a PR line as not estimated. Matched as substrings."
    )]
    pub no_estimate_keywords: Vec<String>,
}

fn default_fixed_asset_accounts() -> Vec<String> {
    vec!["151101".to_string(), "151201".to_string()]
}

impl EngineConfig {
    pub fn for_entity(entity: EntityKind) -> Self {
        Self {
            entity,
            patterns: PeriodPatterns::default(),
            fixed_asset_accounts: default_fixed_asset_accounts(),
            no_estimate_keywords: Vec::new(),
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(EngineConfig)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
