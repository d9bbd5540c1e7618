use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A raw uploaded row: string keys (Portuguese column headers, case variants
/// tolerated) mapped to string-or-number cell values. Both spreadsheet file
/// parses and spreadsheet-API fetches are normalized to this shape before
/// classification.
pub type RawRow = serde_json::Map<String, serde_json::Value>;

/// Calendar position of a record. `month` is the ordinal produced by
/// [`crate::normalize::month_ordinal`]; `0` marks an unrecognized month name
/// and sorts before every real month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    /// First day of the month, when the ordinal is a real month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        if self.month == 0 {
            None
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month, 1)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum RecordKind {
    Revenue,
    Expense,
}

/// Semantic tag for the well-known category labels of the management report.
///
/// Classification consults the canonical-label table first; substring
/// matching against the same vocabulary is retained as a fallback for
/// variant labels ("Custo Variável - Frete"), since real sheets decorate the
/// canonical names freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum CategoryTag {
    GrossRevenue,
    NetRevenue,
    VariableCost,
    FixedCost,
    VariableTax,
    Marketing,
    Payroll,
    NetResult,
    Other,
}

const CANONICAL_LABELS: [(&str, CategoryTag); 8] = [
    ("FATURAMENTO BRUTO", CategoryTag::GrossRevenue),
    ("FATURAMENTO LÍQUIDO", CategoryTag::NetRevenue),
    ("CUSTO VARIÁVEL", CategoryTag::VariableCost),
    ("CUSTO FIXO (R$)", CategoryTag::FixedCost),
    ("IMPOSTO VARIÁVEL", CategoryTag::VariableTax),
    ("MARKETING", CategoryTag::Marketing),
    ("PESSOAL", CategoryTag::Payroll),
    ("RESULTADO (R$)", CategoryTag::NetResult),
];

impl CategoryTag {
    pub fn from_label(label: &str) -> Self {
        let upper = label.trim().to_uppercase();

        for (canonical, tag) in CANONICAL_LABELS {
            if upper == canonical {
                return tag;
            }
        }

        // Fallback: substring heuristics, longest vocabulary first.
        if upper.contains("FATURAMENTO LÍQUIDO") {
            CategoryTag::NetRevenue
        } else if upper.contains("FATURAMENTO") {
            CategoryTag::GrossRevenue
        } else if upper.contains("CUSTO VARIÁVEL") {
            CategoryTag::VariableCost
        } else if upper.contains("CUSTO FIXO") {
            CategoryTag::FixedCost
        } else if upper.contains("IMPOSTO") {
            CategoryTag::VariableTax
        } else if upper.contains("MARKETING") {
            CategoryTag::Marketing
        } else if upper.contains("PESSOAL") {
            CategoryTag::Payroll
        } else if upper.contains("RESULTADO") {
            CategoryTag::NetResult
        } else {
            CategoryTag::Other
        }
    }

    pub fn is_revenue(&self) -> bool {
        matches!(self, CategoryTag::GrossRevenue | CategoryTag::NetRevenue)
    }
}

/// A classified financial line from the management-report sheet. Immutable
/// once created; the owning board replaces its whole record list on the next
/// upload, there is no incremental merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TransactionRecord {
    pub period: Period,
    /// Month label exactly as uploaded; series group by this label, so
    /// "Janeiro" rows from different years share a bucket.
    pub month_label: String,
    pub company: String,
    pub category: String,
    pub subcategory: Option<String>,
    /// Signed amount; revenue positive, costs usually negative.
    pub amount: f64,
    pub kind: RecordKind,
    pub tag: CategoryTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum CostBehavior {
    Fixed,
    Variable,
}

/// Expense-sheet categories treated as fixed cost; everything else counts as
/// variable. Matched by exact label.
pub const FIXED_EXPENSE_CATEGORIES: [&str; 3] =
    ["INFRAESTRUTURA", "ADMINISTRATIVO", "FOLHA DE PAGAMENTO"];

/// A classified line from the expense sheet. Amounts are stored as absolute
/// values; the sheet mixes sign conventions and the expense dashboard only
/// ever charts magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExpenseRecord {
    pub period: Period,
    pub month_label: String,
    pub company: String,
    pub category: String,
    pub subcategory: String,
    /// Absolute amount.
    pub amount: f64,
    /// Revenue rows are kept in the list (they feed the share-of-revenue
    /// KPI) but excluded from every expense aggregate.
    pub kind: RecordKind,
    pub behavior: CostBehavior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum AccountGroup {
    #[schemars(description = "Resources owned by the company (debit balance)")]
    Asset,
    #[schemars(description = "Obligations owed to creditors (credit balance)")]
    Liability,
    #[schemars(description = "Owner's residual interest (credit balance)")]
    Equity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum AccountSubgroup {
    #[schemars(description = "Due or realizable within one year")]
    Current,
    #[schemars(description = "Due or realizable beyond one year")]
    NonCurrent,
    #[schemars(description = "Share capital")]
    Capital,
    #[schemars(description = "Capital and profit reserves")]
    Reserves,
    #[schemars(description = "Accumulated results")]
    RetainedEarnings,
}

/// One account line of a trial-balance snapshot.
///
/// Per company and snapshot the balanced-books invariant must hold:
/// `|Assets − (Liabilities + Equity)| < 1.0` (one unit of currency). Its
/// boolean result is a first-class derived value, not a UI label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BalanceAccount {
    pub as_of: Option<NaiveDate>,
    pub code: String,
    pub name: String,
    pub group: AccountGroup,
    pub subgroup: AccountSubgroup,
    pub total_debits: f64,
    pub total_credits: f64,
    /// Signed balance; credit balances may be stored negative and are
    /// displayed as positives by the aggregation layer.
    pub balance: f64,
    pub company: String,
}

/// A budget-versus-actual line for one month and category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BudgetLine {
    pub month: u32,
    pub company: String,
    pub category: String,
    pub budgeted: f64,
    pub actual: f64,
}

impl BudgetLine {
    pub fn variance(&self) -> f64 {
        self.actual - self.budgeted
    }

    pub fn variance_pct(&self) -> f64 {
        if self.budgeted > 0.0 {
            (self.actual - self.budgeted) / self.budgeted * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum FlowDirection {
    Receivable,
    Payable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum SettlementStatus {
    Open,
    Partial,
    Paid,
    Late,
}

/// One receivable or payable of the cash-flow sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CashflowEntry {
    pub month: u32,
    pub company: String,
    pub direction: FlowDirection,
    pub category: String,
    pub due_date: Option<NaiveDate>,
    pub amount: f64,
    pub status: SettlementStatus,
}

/// The documented shape of one management-report upload row. This struct is
/// the source of truth for the upload collaborator's "expected format"
/// table: its JSON Schema is what gets published, while actual
/// classification stays tolerant of header casing and missing columns.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UploadRow {
    #[serde(rename = "Ano")]
    #[schemars(description = "Calendar year of the entry, e.g. 2025")]
    pub ano: i32,

    #[serde(rename = "Mes")]
    #[schemars(description = "Portuguese month name or 3-letter abbreviation, e.g. 'Janeiro' or 'jan'")]
    pub mes: String,

    #[serde(rename = "Categoria")]
    #[schemars(description = "Category label from the management report, e.g. 'Faturamento Bruto', 'Custo Variável'")]
    pub categoria: String,

    #[serde(rename = "Subcategoria", default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Optional finer-grained label within the category")]
    pub subcategoria: Option<String>,

    #[serde(rename = "Empresa")]
    #[schemars(description = "Company the entry belongs to")]
    pub empresa: String,

    #[serde(rename = "Valor")]
    #[schemars(description = "Signed amount as a number or currency string, e.g. -1234.56 or 'R$ 1.234,56'")]
    pub valor: serde_json::Value,
}

impl UploadRow {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(UploadRow)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_tag_canonical_labels() {
        assert_eq!(
            CategoryTag::from_label("Faturamento Bruto"),
            CategoryTag::GrossRevenue
        );
        assert_eq!(
            CategoryTag::from_label("FATURAMENTO LÍQUIDO"),
            CategoryTag::NetRevenue
        );
        assert_eq!(
            CategoryTag::from_label("Custo Fixo (R$)"),
            CategoryTag::FixedCost
        );
        assert_eq!(
            CategoryTag::from_label("RESULTADO (R$)"),
            CategoryTag::NetResult
        );
    }

    #[test]
    fn test_category_tag_substring_fallback() {
        assert_eq!(
            CategoryTag::from_label("Custo Variável - Frete"),
            CategoryTag::VariableCost
        );
        assert_eq!(
            CategoryTag::from_label("Faturamento Bruto Ajustado"),
            CategoryTag::GrossRevenue
        );
        assert_eq!(CategoryTag::from_label("Doações"), CategoryTag::Other);
    }

    #[test]
    fn test_revenue_tags() {
        assert!(CategoryTag::GrossRevenue.is_revenue());
        assert!(CategoryTag::NetRevenue.is_revenue());
        assert!(!CategoryTag::VariableCost.is_revenue());
    }

    #[test]
    fn test_period_first_day() {
        let period = Period { year: 2025, month: 3 };
        assert_eq!(period.first_day(), NaiveDate::from_ymd_opt(2025, 3, 1));

        let unknown = Period { year: 2025, month: 0 };
        assert_eq!(unknown.first_day(), None);
    }

    #[test]
    fn test_budget_line_variance() {
        let line = BudgetLine {
            month: 1,
            company: "Alpha".to_string(),
            category: "Marketing".to_string(),
            budgeted: 15_000.0,
            actual: 17_500.0,
        };
        assert_eq!(line.variance(), 2_500.0);
        assert!((line.variance_pct() - 16.666).abs() < 0.01);

        let unplanned = BudgetLine {
            month: 1,
            company: "Alpha".to_string(),
            category: "Multas".to_string(),
            budgeted: 0.0,
            actual: 500.0,
        };
        assert_eq!(unplanned.variance_pct(), 0.0);
    }

    #[test]
    fn test_upload_schema_generation() {
        let schema_json = UploadRow::schema_as_json().unwrap();
        assert!(schema_json.contains("Ano"));
        assert!(schema_json.contains("Categoria"));
        assert!(schema_json.contains("Valor"));
    }

    #[test]
    fn test_record_serialization_roundtrip() {
        let record = TransactionRecord {
            period: Period { year: 2025, month: 1 },
            month_label: "Janeiro".to_string(),
            company: "Alpha".to_string(),
            category: "Faturamento Bruto".to_string(),
            subcategory: None,
            amount: 1000.0,
            kind: RecordKind::Revenue,
            tag: CategoryTag::GrossRevenue,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: TransactionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
