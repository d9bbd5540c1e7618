//! Raw-row classification.
//!
//! Maps uploaded rows onto the typed record shapes. Classification is total:
//! it never returns an error. Rows missing a required field are dropped and
//! counted in a log diagnostic only; the caller sees a smaller (possibly
//! empty) record set, which is exactly how the dashboards detect "no data
//! loaded".

use crate::error::{DashboardError, Result};
use crate::normalize::{fold_label, month_ordinal, parse_amount, parse_day};
use crate::schema::{
    AccountGroup, AccountSubgroup, BalanceAccount, BudgetLine, CashflowEntry, CategoryTag,
    CostBehavior, ExpenseRecord, FlowDirection, Period, RawRow, RecordKind, SettlementStatus,
    TransactionRecord, FIXED_EXPENSE_CATEGORIES,
};
use log::warn;
use serde_json::Value;

/// Year used when the year cell exists but does not parse as an integer.
const FALLBACK_YEAR: i32 = 2024;

/// Case-insensitive field accessor: returns the first cell whose header
/// matches any of the accepted aliases, ignoring capitalization.
pub fn field<'a>(row: &'a RawRow, aliases: &[&str]) -> Option<&'a Value> {
    for (key, value) in row {
        let folded = fold_label(key);
        if aliases.iter().any(|alias| folded == *alias) {
            return Some(value);
        }
    }
    None
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn required_text(row: &RawRow, aliases: &[&str]) -> Option<String> {
    let value = text(field(row, aliases)?);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_year(value: &Value) -> i32 {
    if let Some(year) = value.as_i64() {
        return year as i32;
    }
    text(value).parse::<i32>().unwrap_or(FALLBACK_YEAR)
}

fn parse_month_number(value: &Value) -> u32 {
    if let Some(month) = value.as_u64() {
        return month as u32;
    }
    let label = text(value);
    label.parse::<u32>().unwrap_or_else(|_| month_ordinal(&label))
}

/// Parses a JSON upload payload into raw rows. Non-object elements are
/// skipped; a payload that is not an array at all is rejected, since that
/// points at a broken upload collaborator rather than at dirty data.
pub fn rows_from_json(payload: &str) -> Result<Vec<RawRow>> {
    let value: Value = serde_json::from_str(payload)?;
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect()),
        other => Err(DashboardError::InvalidPayload(format!(
            "expected an array of row objects, got {}",
            match other {
                Value::Object(_) => "a single object",
                Value::String(_) => "a string",
                Value::Number(_) => "a number",
                Value::Bool(_) => "a boolean",
                Value::Null => "null",
                Value::Array(_) => unreachable!(),
            }
        ))),
    }
}

/// Classifies management-report rows into [`TransactionRecord`]s.
///
/// Required columns: year, month, category, company, amount. The amount cell
/// only needs to be present (zero is a valid amount); the others must be
/// non-blank.
pub fn classify_transactions(rows: &[RawRow]) -> Vec<TransactionRecord> {
    let mut records = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        match transaction_from_row(row) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(
            "skipped {dropped} of {} uploaded rows with missing required fields",
            rows.len()
        );
    }

    records
}

fn transaction_from_row(row: &RawRow) -> Option<TransactionRecord> {
    let year = parse_year(field(row, &["ano"])?);
    let month_label = required_text(row, &["mes"])?;
    let category = required_text(row, &["categoria"])?;
    let company = required_text(row, &["empresa"])?;
    let amount = parse_amount(field(row, &["valor"])?);

    let subcategory = field(row, &["subcategoria"])
        .map(text)
        .filter(|s| !s.is_empty());

    let tag = CategoryTag::from_label(&category);
    let kind = if tag.is_revenue() {
        RecordKind::Revenue
    } else {
        RecordKind::Expense
    };

    Some(TransactionRecord {
        period: Period {
            year,
            month: month_ordinal(&month_label),
        },
        month_label,
        company,
        category,
        subcategory,
        amount,
        kind,
        tag,
    })
}

/// Classifies expense-sheet rows. Same required columns as the
/// management-report sheet; amounts are folded to absolute values and each
/// expense is tagged fixed or variable by the category allow-list.
pub fn classify_expenses(rows: &[RawRow]) -> Vec<ExpenseRecord> {
    let mut records = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        match expense_from_row(row) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(
            "skipped {dropped} of {} expense rows with missing required fields",
            rows.len()
        );
    }

    records
}

fn expense_from_row(row: &RawRow) -> Option<ExpenseRecord> {
    let year = parse_year(field(row, &["ano"])?);
    let month_label = required_text(row, &["mes"])?;
    let category = required_text(row, &["categoria"])?;
    let company = required_text(row, &["empresa"])?;
    let amount = parse_amount(field(row, &["valor"])?).abs();

    let subcategory = field(row, &["subcategoria"]).map(text).unwrap_or_default();

    let tag = CategoryTag::from_label(&category);
    let kind = if tag.is_revenue() {
        RecordKind::Revenue
    } else {
        RecordKind::Expense
    };

    let behavior = if FIXED_EXPENSE_CATEGORIES.contains(&category.as_str()) {
        CostBehavior::Fixed
    } else {
        CostBehavior::Variable
    };

    Some(ExpenseRecord {
        period: Period {
            year,
            month: month_ordinal(&month_label),
        },
        month_label,
        company,
        category,
        subcategory,
        amount,
        kind,
        behavior,
    })
}

fn parse_group(label: &str) -> Option<AccountGroup> {
    match fold_label(label).as_str() {
        "ativo" => Some(AccountGroup::Asset),
        "passivo" => Some(AccountGroup::Liability),
        "pl" | "patrimonio liquido" => Some(AccountGroup::Equity),
        _ => None,
    }
}

fn parse_subgroup(label: &str) -> Option<AccountSubgroup> {
    match fold_label(label).as_str() {
        "circulante" => Some(AccountSubgroup::Current),
        "nao circulante" => Some(AccountSubgroup::NonCurrent),
        "capital" => Some(AccountSubgroup::Capital),
        "reservas" => Some(AccountSubgroup::Reserves),
        "resultados" => Some(AccountSubgroup::RetainedEarnings),
        _ => None,
    }
}

/// Classifies trial-balance rows into [`BalanceAccount`]s. Rows with an
/// unrecognized group or subgroup label cannot be bucketed and are dropped
/// like any other malformed row.
pub fn classify_balance_accounts(rows: &[RawRow]) -> Vec<BalanceAccount> {
    let mut accounts = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        match balance_account_from_row(row) {
            Some(account) => accounts.push(account),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(
            "skipped {dropped} of {} trial-balance rows with missing or unrecognized fields",
            rows.len()
        );
    }

    accounts
}

fn balance_account_from_row(row: &RawRow) -> Option<BalanceAccount> {
    let name = required_text(row, &["nomecontacontabil", "nome da conta", "nome"])?;
    let group = parse_group(&required_text(row, &["grupo"])?)?;
    let subgroup = parse_subgroup(&required_text(row, &["subgrupo"])?)?;
    let company = required_text(row, &["empresa"])?;
    let balance = parse_amount(field(row, &["saldo"])?);

    let as_of = field(row, &["data"]).map(text).and_then(|s| parse_day(&s));
    let code = field(row, &["contacontabil", "conta contabil", "conta"])
        .map(text)
        .unwrap_or_default();
    let total_debits = field(row, &["totaldebitos", "total debitos", "debitos"])
        .map(parse_amount)
        .unwrap_or(0.0);
    let total_credits = field(row, &["totalcreditos", "total creditos", "creditos"])
        .map(parse_amount)
        .unwrap_or(0.0);

    Some(BalanceAccount {
        as_of,
        code,
        name,
        group,
        subgroup,
        total_debits,
        total_credits,
        balance,
        company,
    })
}

/// Classifies budget-sheet rows (month, company, category, budgeted, actual).
pub fn classify_budget_lines(rows: &[RawRow]) -> Vec<BudgetLine> {
    let mut lines = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        match budget_line_from_row(row) {
            Some(line) => lines.push(line),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(
            "skipped {dropped} of {} budget rows with missing required fields",
            rows.len()
        );
    }

    lines
}

fn budget_line_from_row(row: &RawRow) -> Option<BudgetLine> {
    let month = parse_month_number(field(row, &["mes"])?);
    let company = required_text(row, &["empresa"])?;
    let category = required_text(row, &["categoria"])?;
    let budgeted = parse_amount(field(row, &["orcado"])?);
    let actual = parse_amount(field(row, &["realizado"])?);

    Some(BudgetLine {
        month,
        company,
        category,
        budgeted,
        actual,
    })
}

fn parse_direction(label: &str) -> Option<FlowDirection> {
    match fold_label(label).as_str() {
        "receber" => Some(FlowDirection::Receivable),
        "pagar" => Some(FlowDirection::Payable),
        _ => None,
    }
}

fn parse_status(label: &str) -> Option<SettlementStatus> {
    match fold_label(label).as_str() {
        "aberto" => Some(SettlementStatus::Open),
        "parcial" => Some(SettlementStatus::Partial),
        "pago" => Some(SettlementStatus::Paid),
        "atrasado" => Some(SettlementStatus::Late),
        _ => None,
    }
}

/// Classifies cash-flow sheet rows (receivables and payables).
pub fn classify_cashflow_entries(rows: &[RawRow]) -> Vec<CashflowEntry> {
    let mut entries = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        match cashflow_entry_from_row(row) {
            Some(entry) => entries.push(entry),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(
            "skipped {dropped} of {} cash-flow rows with missing or unrecognized fields",
            rows.len()
        );
    }

    entries
}

fn cashflow_entry_from_row(row: &RawRow) -> Option<CashflowEntry> {
    let month = parse_month_number(field(row, &["mes"])?);
    let company = required_text(row, &["empresa"])?;
    let direction = parse_direction(&required_text(row, &["tipo"])?)?;
    let category = required_text(row, &["categoria"])?;
    let amount = parse_amount(field(row, &["valor"])?);
    let status = parse_status(&required_text(row, &["status"])?)?;

    let due_date = field(row, &["data_vencimento", "vencimento"])
        .map(text)
        .and_then(|s| parse_day(&s));

    Some(CashflowEntry {
        month,
        company,
        direction,
        category,
        due_date,
        amount,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> RawRow {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_field_accessor_ignores_header_case() {
        let r = row(json!({"Ano": 2025, "MES": "Janeiro", "categoria": "Pessoal"}));
        assert!(field(&r, &["ano"]).is_some());
        assert!(field(&r, &["mes"]).is_some());
        assert!(field(&r, &["categoria"]).is_some());
        assert!(field(&r, &["empresa"]).is_none());
    }

    #[test]
    fn test_classify_transactions_basic() {
        let rows = vec![
            row(json!({
                "Ano": 2025, "Mes": "Janeiro", "Categoria": "Faturamento Bruto",
                "Empresa": "Alpha", "Valor": 1000
            })),
            row(json!({
                "ano": "2025", "mes": "Janeiro", "categoria": "Custo Variável",
                "empresa": "Alpha", "valor": "R$ -300,00"
            })),
        ];

        let records = classify_transactions(&rows);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].kind, RecordKind::Revenue);
        assert_eq!(records[0].amount, 1000.0);
        assert_eq!(records[0].period, Period { year: 2025, month: 1 });

        assert_eq!(records[1].kind, RecordKind::Expense);
        assert_eq!(records[1].amount, -300.0);
        assert_eq!(records[1].tag, CategoryTag::VariableCost);
    }

    #[test]
    fn test_row_missing_company_is_dropped() {
        let rows = vec![
            row(json!({"Ano": 2025, "Mes": "Janeiro", "Categoria": "Pessoal", "Valor": 10})),
            row(json!({
                "Ano": 2025, "Mes": "Janeiro", "Categoria": "Pessoal",
                "Empresa": "Alpha", "Valor": 10
            })),
        ];

        let records = classify_transactions(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].company, "Alpha");
    }

    #[test]
    fn test_blank_required_field_is_dropped() {
        let rows = vec![row(json!({
            "Ano": 2025, "Mes": "", "Categoria": "Pessoal",
            "Empresa": "Alpha", "Valor": 10
        }))];
        assert!(classify_transactions(&rows).is_empty());
    }

    #[test]
    fn test_zero_amount_is_a_valid_row() {
        let rows = vec![row(json!({
            "Ano": 2025, "Mes": "Janeiro", "Categoria": "Pessoal",
            "Empresa": "Alpha", "Valor": 0
        }))];
        assert_eq!(classify_transactions(&rows).len(), 1);
    }

    #[test]
    fn test_unparseable_year_falls_back() {
        let rows = vec![row(json!({
            "Ano": "n/a", "Mes": "Janeiro", "Categoria": "Pessoal",
            "Empresa": "Alpha", "Valor": 10
        }))];
        let records = classify_transactions(&rows);
        assert_eq!(records[0].period.year, FALLBACK_YEAR);
    }

    #[test]
    fn test_unknown_month_gets_ordinal_zero() {
        let rows = vec![row(json!({
            "Ano": 2025, "Mes": "Janvier", "Categoria": "Pessoal",
            "Empresa": "Alpha", "Valor": 10
        }))];
        let records = classify_transactions(&rows);
        assert_eq!(records[0].period.month, 0);
    }

    #[test]
    fn test_classify_expenses_absolute_amounts_and_behavior() {
        let rows = vec![
            row(json!({
                "Ano": 2025, "Mes": "Janeiro", "Categoria": "INFRAESTRUTURA",
                "Subcategoria": "Aluguel", "Empresa": "Alpha", "Valor": -5000
            })),
            row(json!({
                "Ano": 2025, "Mes": "Janeiro", "Categoria": "Fornecedores",
                "Empresa": "Alpha", "Valor": -2000
            })),
        ];

        let records = classify_expenses(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, 5000.0);
        assert_eq!(records[0].behavior, CostBehavior::Fixed);
        assert_eq!(records[0].subcategory, "Aluguel");
        assert_eq!(records[1].behavior, CostBehavior::Variable);
    }

    #[test]
    fn test_classify_balance_accounts() {
        let rows = vec![
            row(json!({
                "Data": "31/12/2024", "ContaContabil": "1.01", "NomeContaContabil": "Caixa",
                "Grupo": "Ativo", "Subgrupo": "Circulante",
                "TotalDebitos": 12000, "TotalCreditos": 2000,
                "Saldo": 10000, "Empresa": "Alpha"
            })),
            row(json!({
                "Data": "31/12/2024", "NomeContaContabil": "Misterio",
                "Grupo": "Outro", "Subgrupo": "Circulante",
                "Saldo": 10, "Empresa": "Alpha"
            })),
        ];

        let accounts = classify_balance_accounts(&rows);
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].group, AccountGroup::Asset);
        assert_eq!(accounts[0].subgroup, AccountSubgroup::Current);
        assert_eq!(accounts[0].balance, 10000.0);
        assert_eq!(
            accounts[0].as_of,
            chrono::NaiveDate::from_ymd_opt(2024, 12, 31)
        );
    }

    #[test]
    fn test_classify_cashflow_entries() {
        let rows = vec![row(json!({
            "Mes": 3, "Empresa": "Alpha", "Tipo": "Receber", "Categoria": "Vendas",
            "Data_Vencimento": "15/03/2025", "Valor": 800, "Status": "Aberto"
        }))];

        let entries = classify_cashflow_entries(&rows);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].direction, FlowDirection::Receivable);
        assert_eq!(entries[0].status, SettlementStatus::Open);
        assert_eq!(entries[0].month, 3);
    }

    #[test]
    fn test_rows_from_json() {
        let rows = rows_from_json(r#"[{"Ano": 2025}, 42, {"Mes": "Jan"}]"#).unwrap();
        assert_eq!(rows.len(), 2);

        assert!(rows_from_json(r#"{"Ano": 2025}"#).is_err());
        assert!(rows_from_json("not json").is_err());
    }

    #[test]
    fn test_classification_is_idempotent() {
        let rows = vec![row(json!({
            "Ano": 2025, "Mes": "Janeiro", "Categoria": "Faturamento Bruto",
            "Empresa": "Alpha", "Valor": 1000
        }))];

        let first = classify_transactions(&rows);
        let second = classify_transactions(&rows);
        assert_eq!(first, second);
    }
}
