//! Per-dashboard state.
//!
//! Each dashboard section owns its record list and filter scope as an
//! explicit, independently constructed value; there is no shared global
//! ledger and no cross-section consistency. Loading replaces the whole
//! record list and resets the scope; derived views are recomputed from
//! scratch on every call.

use crate::aggregate::{
    self, budget_summary, budget_variances, cashflow_summary, distinct, sorted_month_labels,
    BudgetSummary, CashflowSummary, CategorySlice, CategoryVariance, CompanyPerformance,
    EvolutionPoint, ExpenseKpis, KpiBundle, MonthlyExpense, PeriodFlow,
};
use crate::balance::{AccountRanking, BalanceSheetView, CapitalStructure};
use crate::catalog::DataCatalog;
use crate::classify::{
    classify_balance_accounts, classify_budget_lines, classify_cashflow_entries,
    classify_expenses, classify_transactions,
};
use crate::filter::{CompanyFilter, FilterScope};
use crate::schema::{
    AccountGroup, BalanceAccount, BudgetLine, CashflowEntry, ExpenseRecord, RawRow, RecordKind,
    TransactionRecord,
};
use chrono::{Local, NaiveDate};
use log::debug;

/// The overview dashboard: management-report records filtered by company and
/// months.
#[derive(Debug, Default)]
pub struct OverviewBoard {
    records: Vec<TransactionRecord>,
    filter: FilterScope,
    loaded_at: Option<NaiveDate>,
}

impl OverviewBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, rows: &[RawRow]) {
        self.load_dated(rows, Local::now().date_naive());
    }

    pub fn load_dated(&mut self, rows: &[RawRow], date: NaiveDate) {
        let records = classify_transactions(rows);
        if records.is_empty() {
            debug!("overview upload produced no usable records");
            self.records.clear();
            self.filter = FilterScope::all();
            return;
        }

        let months = sorted_month_labels(records.iter().map(|r| r.month_label.as_str()));
        self.records = records;
        self.filter.reset(months);
        self.loaded_at = Some(date);
    }

    /// The normalized record list, for the persistence collaborator.
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn filter(&self) -> &FilterScope {
        &self.filter
    }

    pub fn loaded_at(&self) -> Option<NaiveDate> {
        self.loaded_at
    }

    pub fn set_company(&mut self, company: CompanyFilter) {
        self.filter.set_company(company);
    }

    pub fn set_months(&mut self, months: Vec<String>) {
        self.filter.set_months(months);
    }

    pub fn companies(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.company.as_str()))
    }

    pub fn months_available(&self) -> Vec<String> {
        sorted_month_labels(self.records.iter().map(|r| r.month_label.as_str()))
    }

    pub fn catalog(&self) -> DataCatalog {
        DataCatalog::from_transactions(&self.records)
    }

    pub fn filtered(&self) -> Vec<TransactionRecord> {
        self.records
            .iter()
            .filter(|r| self.filter.allows(&r.company, &r.month_label, &r.category))
            .cloned()
            .collect()
    }

    pub fn kpis(&self) -> KpiBundle {
        aggregate::kpis(&self.filtered())
    }

    pub fn monthly_flow(&self) -> Vec<PeriodFlow> {
        aggregate::monthly_flow(&self.filtered())
    }

    pub fn category_breakdown(&self) -> Vec<CategorySlice> {
        aggregate::category_breakdown(&self.filtered())
    }

    pub fn company_performance(&self) -> Vec<CompanyPerformance> {
        aggregate::company_performance(&self.filtered())
    }
}

/// The expense dashboard: expense records filtered by company, months and
/// categories.
#[derive(Debug, Default)]
pub struct ExpenseBoard {
    records: Vec<ExpenseRecord>,
    filter: FilterScope,
    loaded_at: Option<NaiveDate>,
}

impl ExpenseBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, rows: &[RawRow]) {
        self.load_dated(rows, Local::now().date_naive());
    }

    pub fn load_dated(&mut self, rows: &[RawRow], date: NaiveDate) {
        let records = classify_expenses(rows);
        if records.is_empty() {
            debug!("expense upload produced no usable records");
            self.records.clear();
            self.filter = FilterScope::all();
            return;
        }

        let months = sorted_month_labels(records.iter().map(|r| r.month_label.as_str()));
        self.records = records;
        self.filter.reset(months);
        self.loaded_at = Some(date);
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn filter(&self) -> &FilterScope {
        &self.filter
    }

    pub fn loaded_at(&self) -> Option<NaiveDate> {
        self.loaded_at
    }

    pub fn set_company(&mut self, company: CompanyFilter) {
        self.filter.set_company(company);
    }

    pub fn set_months(&mut self, months: Vec<String>) {
        self.filter.set_months(months);
    }

    pub fn set_categories(&mut self, categories: Vec<String>) {
        self.filter.set_categories(categories);
    }

    pub fn companies(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.company.as_str()))
    }

    pub fn months_available(&self) -> Vec<String> {
        sorted_month_labels(self.records.iter().map(|r| r.month_label.as_str()))
    }

    pub fn categories_available(&self) -> Vec<String> {
        let mut categories = distinct(self.records.iter().map(|r| r.category.as_str()));
        categories.sort();
        categories
    }

    pub fn subcategories_available(&self) -> Vec<String> {
        let mut subcategories = distinct(
            self.records
                .iter()
                .map(|r| r.subcategory.as_str())
                .filter(|s| !s.is_empty()),
        );
        subcategories.sort();
        subcategories
    }

    pub fn catalog(&self) -> DataCatalog {
        DataCatalog::from_expenses(&self.records)
    }

    /// Expense-kind records within the current scope. Revenue rows stay out
    /// of every expense aggregate.
    pub fn filtered(&self) -> Vec<ExpenseRecord> {
        self.records
            .iter()
            .filter(|r| {
                r.kind == RecordKind::Expense
                    && self.filter.allows(&r.company, &r.month_label, &r.category)
            })
            .cloned()
            .collect()
    }

    pub fn kpis(&self) -> ExpenseKpis {
        aggregate::expense_kpis(&self.records, &self.filter)
    }

    pub fn monthly_totals(&self) -> Vec<MonthlyExpense> {
        aggregate::expense_monthly(&self.filtered())
    }

    pub fn breakdown(&self) -> Vec<CategorySlice> {
        aggregate::expense_breakdown(&self.filtered())
    }

    pub fn evolution(&self) -> Vec<EvolutionPoint> {
        aggregate::expense_evolution(&self.filtered())
    }
}

/// The balance-sheet dashboard: trial-balance accounts scoped to a single
/// selected company.
#[derive(Debug, Default)]
pub struct BalanceBoard {
    accounts: Vec<BalanceAccount>,
    selected_company: Option<String>,
}

impl BalanceBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, rows: &[RawRow]) {
        self.accounts = classify_balance_accounts(rows);

        // Keep the current selection when it survives the new data,
        // otherwise move to the first company present.
        let companies = self.companies();
        self.selected_company = match self.selected_company.take() {
            Some(current) if companies.iter().any(|c| *c == current) => Some(current),
            _ => companies.first().cloned(),
        };
    }

    pub fn accounts(&self) -> &[BalanceAccount] {
        &self.accounts
    }

    pub fn companies(&self) -> Vec<String> {
        distinct(self.accounts.iter().map(|a| a.company.as_str()))
    }

    pub fn selected_company(&self) -> Option<&str> {
        self.selected_company.as_deref()
    }

    /// No validation: selecting a company absent from the data simply
    /// scopes every aggregate down to nothing.
    pub fn select_company(&mut self, company: impl Into<String>) {
        self.selected_company = Some(company.into());
    }

    pub fn filtered(&self) -> Vec<BalanceAccount> {
        match &self.selected_company {
            Some(company) => self
                .accounts
                .iter()
                .filter(|a| a.company == *company)
                .cloned()
                .collect(),
            None => self.accounts.clone(),
        }
    }

    pub fn total_assets(&self) -> f64 {
        let accounts = self.filtered();
        BalanceSheetView::new(&accounts).group_total(AccountGroup::Asset)
    }

    pub fn total_liabilities(&self) -> f64 {
        let accounts = self.filtered();
        BalanceSheetView::new(&accounts).group_total(AccountGroup::Liability)
    }

    pub fn total_equity(&self) -> f64 {
        let accounts = self.filtered();
        BalanceSheetView::new(&accounts).group_total(AccountGroup::Equity)
    }

    pub fn is_balanced(&self) -> bool {
        let accounts = self.filtered();
        BalanceSheetView::new(&accounts).is_balanced()
    }

    pub fn current_ratio(&self) -> f64 {
        let accounts = self.filtered();
        BalanceSheetView::new(&accounts).current_ratio()
    }

    pub fn leverage_pct(&self) -> f64 {
        let accounts = self.filtered();
        BalanceSheetView::new(&accounts).leverage_pct()
    }

    pub fn equity_pct(&self) -> f64 {
        let accounts = self.filtered();
        BalanceSheetView::new(&accounts).equity_pct()
    }

    pub fn capital_structure(&self) -> CapitalStructure {
        let accounts = self.filtered();
        BalanceSheetView::new(&accounts).capital_structure()
    }

    pub fn rank_accounts(&self, group: Option<AccountGroup>, n: usize) -> AccountRanking {
        let accounts = self.filtered();
        BalanceSheetView::new(&accounts).rank_accounts(group, n)
    }
}

/// The budget dashboard: budget-versus-actual lines, unfiltered.
#[derive(Debug, Default)]
pub struct BudgetBoard {
    lines: Vec<BudgetLine>,
}

impl BudgetBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, rows: &[RawRow]) {
        self.lines = classify_budget_lines(rows);
    }

    pub fn lines(&self) -> &[BudgetLine] {
        &self.lines
    }

    pub fn companies(&self) -> Vec<String> {
        distinct(self.lines.iter().map(|l| l.company.as_str()))
    }

    pub fn categories(&self) -> Vec<String> {
        distinct(self.lines.iter().map(|l| l.category.as_str()))
    }

    pub fn summary(&self) -> BudgetSummary {
        budget_summary(&self.lines)
    }

    pub fn variances_by_category(&self) -> Vec<CategoryVariance> {
        budget_variances(&self.lines)
    }
}

/// The cash-flow dashboard: receivables and payables.
#[derive(Debug, Default)]
pub struct CashflowBoard {
    entries: Vec<CashflowEntry>,
}

impl CashflowBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, rows: &[RawRow]) {
        self.entries = classify_cashflow_entries(rows);
    }

    pub fn entries(&self) -> &[CashflowEntry] {
        &self.entries
    }

    pub fn companies(&self) -> Vec<String> {
        distinct(self.entries.iter().map(|e| e.company.as_str()))
    }

    pub fn categories(&self) -> Vec<String> {
        distinct(self.entries.iter().map(|e| e.category.as_str()))
    }

    pub fn summary(&self) -> CashflowSummary {
        self.summary_as_of(Local::now().date_naive())
    }

    pub fn summary_as_of(&self, today: NaiveDate) -> CashflowSummary {
        cashflow_summary(&self.entries, today)
    }

    pub fn for_company(&self, company: &str) -> Vec<CashflowEntry> {
        self.entries
            .iter()
            .filter(|e| e.company == company)
            .cloned()
            .collect()
    }

    pub fn in_month_range(&self, start: u32, end: u32) -> Vec<CashflowEntry> {
        self.entries
            .iter()
            .filter(|e| e.month >= start && e.month <= end)
            .cloned()
            .collect()
    }
}
