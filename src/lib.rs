//! # Financial Dashboard Core
//!
//! A library for turning labelled financial spreadsheet rows into the KPIs,
//! time series, categorical breakdowns and balance-sheet summaries a
//! management dashboard renders.
//!
//! ## Core Concepts
//!
//! - **Raw rows**: JSON objects with Portuguese column headers (case
//!   variants tolerated) and string-or-number cells, supplied by the upload
//!   collaborator — the engine does not care whether they came from a
//!   spreadsheet file or a spreadsheet API.
//! - **Typed records**: transactions, expenses, trial-balance accounts,
//!   budget lines and cash-flow entries produced by the classifier.
//!   Malformed rows are dropped silently; unparseable cells degrade to
//!   zero.
//! - **Boards**: one owned state object per dashboard section (overview,
//!   expenses, balance sheet, budget, cash flow), each holding its record
//!   list and filter scope independently.
//! - **Total aggregation**: every derived view is a pure function of
//!   (records, scope) that never fails — empty input yields zero/empty
//!   output and all divisions are guarded.
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_dashboard_core::*;
//!
//! let rows = rows_from_json(upload_payload)?;
//!
//! let mut board = OverviewBoard::new();
//! board.load(&rows);
//!
//! board.set_company(CompanyFilter::Only("Alpha".to_string()));
//! let kpis = board.kpis();
//! println!("contribution margin: {}", kpis.contribution_margin);
//!
//! for point in board.monthly_flow() {
//!     println!("{}: +{} -{}", point.month, point.inflow, point.outflow);
//! }
//! ```

pub mod aggregate;
pub mod balance;
pub mod catalog;
pub mod classify;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod schema;
pub mod session;

pub use aggregate::{
    budget_summary, budget_variances, cashflow_summary, category_breakdown, company_performance,
    expense_breakdown, expense_evolution, expense_kpis, expense_monthly, kpis, monthly_flow,
    sorted_month_labels, BudgetSummary, CashflowSummary, CategorySlice, CategoryVariance,
    CompanyPerformance, EvolutionPoint, ExpenseKpis, KpiBundle, MonthlyExpense, PeriodFlow,
    OVERVIEW_CATEGORIES,
};
pub use balance::{
    AccountRanking, BalanceSheetView, CapitalStructure, RankedAccount, SolidityGrade,
};
pub use catalog::{snapshot_from_json, snapshot_to_json, write_snapshot, DataCatalog};
pub use classify::{
    classify_balance_accounts, classify_budget_lines, classify_cashflow_entries,
    classify_expenses, classify_transactions, rows_from_json,
};
pub use error::{DashboardError, Result};
pub use filter::{CompanyFilter, FilterScope};
pub use normalize::{month_ordinal, parse_amount};
pub use schema::*;
pub use session::{BalanceBoard, BudgetBoard, CashflowBoard, ExpenseBoard, OverviewBoard};
