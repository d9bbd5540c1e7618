//! The aggregation engine.
//!
//! Every derived view the dashboards consume is produced here, recomputed in
//! full from `(records, scope)` on every input change. All functions are
//! total: empty or degenerate input yields zero/empty output and every
//! division guards its denominator.

use crate::filter::FilterScope;
use crate::normalize::month_ordinal;
use crate::schema::{
    BudgetLine, CashflowEntry, CategoryTag, ExpenseRecord, FlowDirection, RecordKind,
    SettlementStatus, TransactionRecord,
};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// The fixed category list of the overview cost breakdown. Kept in display
/// order; this call site intentionally does not re-sort by value.
pub const OVERVIEW_CATEGORIES: [&str; 5] = [
    "Custo Variável",
    "Custo Fixo (R$)",
    "Imposto Variável",
    "Marketing",
    "Pessoal",
];

/// Net inflow/outflow of one month, keyed by the uploaded month label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodFlow {
    pub month: String,
    pub inflow: f64,
    pub outflow: f64,
}

/// One group of a categorical breakdown. `percentage` is independently
/// rounded per slice, so a breakdown's percentages sum to 100 ± 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub name: String,
    pub value: f64,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyExpense {
    pub month: String,
    pub ordinal: u32,
    pub total: f64,
}

/// One cell of the month × top-category expense evolution matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionPoint {
    pub month: String,
    pub category: String,
    pub value: f64,
}

/// Revenue of one company normalized against the best performer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyPerformance {
    pub name: String,
    pub performance: i64,
}

/// Scalar KPI bundle of the overview dashboard.
///
/// `contribution_margin` is net revenue minus the magnitude of variable
/// cost; when the data carries no net-revenue rows, gross revenue stands in
/// as the net figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiBundle {
    pub gross_revenue: f64,
    pub net_revenue: f64,
    /// Signed sum of variable-cost rows (usually negative).
    pub variable_cost: f64,
    pub fixed_cost: f64,
    pub contribution_margin: f64,
    pub contribution_margin_pct: f64,
    pub net_result: f64,
    pub net_margin_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseKpis {
    pub total: f64,
    pub fixed_total: f64,
    pub variable_total: f64,
    /// Total divided by the number of distinct months in scope.
    pub monthly_average: f64,
    /// Expenses as a share of the revenue in the same company/month scope.
    pub revenue_share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub budgeted_total: f64,
    pub actual_total: f64,
    pub variance: f64,
    pub variance_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVariance {
    pub category: String,
    pub budgeted: f64,
    pub actual: f64,
    pub variance: f64,
    pub variance_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowSummary {
    /// Receivables minus payables over settled (paid or partial) entries.
    pub settled_balance: f64,
    /// Net amount falling due within the next 30 days.
    pub due_next_30_days: f64,
    /// Settled balance over the average daily open payables.
    pub days_of_cash: i64,
    pub overdue_count: usize,
}

/// Insertion-order deduplication of string values.
pub fn distinct<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Distinct month labels ordered by month ordinal. The sort is stable, so
/// labels sharing an ordinal (including unrecognized ones at ordinal 0)
/// keep their insertion order; ordering is deliberately year-blind, matching
/// the single-year sheets the dashboards are built for.
pub fn sorted_month_labels<'a, I>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut months = distinct(labels);
    months.sort_by_key(|label| month_ordinal(label));
    months
}

fn category_contains(category: &str, needle_upper: &str) -> bool {
    category.to_uppercase().contains(needle_upper)
}

fn is_outflow_category(category: &str) -> bool {
    let upper = category.to_uppercase();
    upper.contains("CUSTO") || upper.contains("GASTO") || upper.contains("IMPOSTO")
}

/// Monthly inflow/outflow series for the overview cash chart. Inflow sums
/// revenue-labelled rows; outflow is the magnitude of cost, spending and tax
/// rows.
pub fn monthly_flow(records: &[TransactionRecord]) -> Vec<PeriodFlow> {
    sorted_month_labels(records.iter().map(|r| r.month_label.as_str()))
        .into_iter()
        .map(|month| {
            let inflow: f64 = records
                .iter()
                .filter(|r| r.month_label == month && category_contains(&r.category, "FATURAMENTO"))
                .map(|r| r.amount)
                .sum();
            let outflow: f64 = records
                .iter()
                .filter(|r| r.month_label == month && is_outflow_category(&r.category))
                .map(|r| r.amount)
                .sum();
            PeriodFlow {
                month,
                inflow,
                outflow: outflow.abs(),
            }
        })
        .collect()
}

fn with_percentages(slices: Vec<(String, f64)>) -> Vec<CategorySlice> {
    let total: f64 = slices.iter().map(|(_, value)| value).sum();
    slices
        .into_iter()
        .map(|(name, value)| CategorySlice {
            name,
            value,
            percentage: if total > 0.0 {
                (value / total * 100.0).round() as u32
            } else {
                0
            },
        })
        .collect()
}

/// Cost breakdown of the overview dashboard over its fixed category list.
/// Zero-valued groups are excluded; the remaining groups keep list order.
pub fn category_breakdown(records: &[TransactionRecord]) -> Vec<CategorySlice> {
    let slices: Vec<(String, f64)> = OVERVIEW_CATEGORIES
        .iter()
        .map(|category| {
            let needle = category.to_uppercase();
            let value: f64 = records
                .iter()
                .filter(|r| category_contains(&r.category, &needle))
                .map(|r| r.amount)
                .sum();
            (category.to_string(), value.abs())
        })
        .filter(|(_, value)| *value > 0.0)
        .collect();

    with_percentages(slices)
}

/// Expense breakdown grouped by exact category label, sorted descending by
/// value. Unlike the overview breakdown this call site does re-sort.
pub fn expense_breakdown(records: &[ExpenseRecord]) -> Vec<CategorySlice> {
    let mut slices: Vec<(String, f64)> = Vec::new();
    for record in records {
        match slices.iter_mut().find(|(name, _)| *name == record.category) {
            Some((_, value)) => *value += record.amount,
            None => slices.push((record.category.clone(), record.amount)),
        }
    }

    let mut slices: Vec<(String, f64)> = slices
        .into_iter()
        .filter(|(_, value)| *value > 0.0)
        .collect();
    slices.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    with_percentages(slices)
}

/// Total expenses per month, ordered by month ordinal.
pub fn expense_monthly(records: &[ExpenseRecord]) -> Vec<MonthlyExpense> {
    sorted_month_labels(records.iter().map(|r| r.month_label.as_str()))
        .into_iter()
        .map(|month| {
            let total: f64 = records
                .iter()
                .filter(|r| r.month_label == month)
                .map(|r| r.amount)
                .sum();
            MonthlyExpense {
                ordinal: month_ordinal(&month),
                month,
                total,
            }
        })
        .collect()
}

/// Month × category matrix over the five largest expense categories,
/// feeding the stacked evolution chart. Months without spend in a category
/// still produce a zero cell, so every series has one point per month.
pub fn expense_evolution(records: &[ExpenseRecord]) -> Vec<EvolutionPoint> {
    let top_categories: Vec<String> = expense_breakdown(records)
        .into_iter()
        .take(5)
        .map(|slice| slice.name)
        .collect();

    let months = sorted_month_labels(records.iter().map(|r| r.month_label.as_str()));

    let mut points = Vec::with_capacity(months.len() * top_categories.len());
    for month in &months {
        for category in &top_categories {
            let value: f64 = records
                .iter()
                .filter(|r| &r.month_label == month && &r.category == category)
                .map(|r| r.amount)
                .sum();
            points.push(EvolutionPoint {
                month: month.clone(),
                category: category.clone(),
                value,
            });
        }
    }
    points
}

/// Expense KPI bundle. The record list passed here is the board's full list:
/// the expense figures honour the whole scope, while the revenue share is
/// computed against revenue rows restricted by company and months only,
/// never by the category selection.
pub fn expense_kpis(records: &[ExpenseRecord], scope: &FilterScope) -> ExpenseKpis {
    let in_scope: Vec<&ExpenseRecord> = records
        .iter()
        .filter(|r| {
            r.kind == RecordKind::Expense && scope.allows(&r.company, &r.month_label, &r.category)
        })
        .collect();

    let total: f64 = in_scope.iter().map(|r| r.amount).sum();
    let fixed_total: f64 = in_scope
        .iter()
        .filter(|r| r.behavior == crate::schema::CostBehavior::Fixed)
        .map(|r| r.amount)
        .sum();

    let month_count = distinct(in_scope.iter().map(|r| r.month_label.as_str())).len();
    let monthly_average = if month_count > 0 {
        total / month_count as f64
    } else {
        0.0
    };

    let revenue_scope = FilterScope {
        company: scope.company.clone(),
        months: scope.months.clone(),
        categories: Vec::new(),
    };
    let revenue: f64 = records
        .iter()
        .filter(|r| {
            r.kind == RecordKind::Revenue
                && revenue_scope.allows(&r.company, &r.month_label, &r.category)
        })
        .map(|r| r.amount)
        .sum();

    ExpenseKpis {
        total,
        fixed_total,
        variable_total: total - fixed_total,
        monthly_average,
        revenue_share_pct: if revenue > 0.0 {
            total / revenue * 100.0
        } else {
            0.0
        },
    }
}

/// Scalar KPI bundle of the overview dashboard.
pub fn kpis(records: &[TransactionRecord]) -> KpiBundle {
    let mut gross_revenue = 0.0;
    let mut net_revenue = 0.0;
    let mut variable_cost = 0.0;
    let mut fixed_cost = 0.0;
    let mut net_result = 0.0;
    let mut has_net_revenue = false;

    for record in records {
        match record.tag {
            CategoryTag::GrossRevenue => gross_revenue += record.amount,
            CategoryTag::NetRevenue => {
                net_revenue += record.amount;
                has_net_revenue = true;
            }
            CategoryTag::VariableCost => variable_cost += record.amount,
            CategoryTag::FixedCost => fixed_cost += record.amount,
            CategoryTag::NetResult => net_result += record.amount,
            _ => {}
        }
    }

    let effective_net = if has_net_revenue {
        net_revenue
    } else {
        gross_revenue
    };
    let contribution_margin = effective_net - variable_cost.abs();

    KpiBundle {
        gross_revenue,
        net_revenue,
        variable_cost,
        fixed_cost,
        contribution_margin,
        contribution_margin_pct: if gross_revenue > 0.0 {
            contribution_margin / gross_revenue * 100.0
        } else {
            0.0
        },
        net_result,
        net_margin_pct: if effective_net > 0.0 {
            net_result / effective_net * 100.0
        } else {
            0.0
        },
    }
}

/// Revenue per company normalized to the best performer, sorted descending.
/// The denominator never drops below one unit, so an all-zero revenue set
/// still yields zero performances instead of a division blow-up.
pub fn company_performance(records: &[TransactionRecord]) -> Vec<CompanyPerformance> {
    let companies = distinct(records.iter().map(|r| r.company.as_str()));

    let revenues: Vec<(String, f64)> = companies
        .into_iter()
        .map(|company| {
            let revenue: f64 = records
                .iter()
                .filter(|r| r.company == company && r.kind == RecordKind::Revenue)
                .map(|r| r.amount)
                .sum();
            (company, revenue)
        })
        .collect();

    let max_revenue = revenues
        .iter()
        .map(|(_, revenue)| *revenue)
        .fold(1.0f64, f64::max);

    let mut entries: Vec<CompanyPerformance> = revenues
        .into_iter()
        .map(|(name, revenue)| CompanyPerformance {
            name,
            performance: (revenue / max_revenue * 100.0).round() as i64,
        })
        .collect();
    entries.sort_by(|a, b| b.performance.cmp(&a.performance));
    entries
}

pub fn budget_summary(lines: &[BudgetLine]) -> BudgetSummary {
    let budgeted_total: f64 = lines.iter().map(|l| l.budgeted).sum();
    let actual_total: f64 = lines.iter().map(|l| l.actual).sum();
    let variance = actual_total - budgeted_total;

    BudgetSummary {
        budgeted_total,
        actual_total,
        variance,
        variance_pct: if budgeted_total > 0.0 {
            variance / budgeted_total * 100.0
        } else {
            0.0
        },
    }
}

/// Budget deviation per category, in first-seen category order.
pub fn budget_variances(lines: &[BudgetLine]) -> Vec<CategoryVariance> {
    let mut totals: Vec<(String, f64, f64)> = Vec::new();
    for line in lines {
        match totals.iter_mut().find(|(name, _, _)| *name == line.category) {
            Some((_, budgeted, actual)) => {
                *budgeted += line.budgeted;
                *actual += line.actual;
            }
            None => totals.push((line.category.clone(), line.budgeted, line.actual)),
        }
    }

    totals
        .into_iter()
        .map(|(category, budgeted, actual)| {
            let variance = actual - budgeted;
            CategoryVariance {
                category,
                budgeted,
                actual,
                variance,
                variance_pct: if budgeted > 0.0 {
                    variance / budgeted * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect()
}

fn signed_amount(entry: &CashflowEntry) -> f64 {
    match entry.direction {
        FlowDirection::Receivable => entry.amount,
        FlowDirection::Payable => -entry.amount,
    }
}

/// Cash-flow KPIs relative to a caller-supplied `today`, keeping the engine
/// clock-free.
pub fn cashflow_summary(entries: &[CashflowEntry], today: NaiveDate) -> CashflowSummary {
    let settled_balance: f64 = entries
        .iter()
        .filter(|e| matches!(e.status, SettlementStatus::Paid | SettlementStatus::Partial))
        .map(signed_amount)
        .sum();

    let horizon = today.checked_add_days(Days::new(30)).unwrap_or(today);
    let due_next_30_days: f64 = entries
        .iter()
        .filter(|e| {
            e.due_date
                .map_or(false, |due| due >= today && due <= horizon)
        })
        .map(signed_amount)
        .sum();

    let open_payables: f64 = entries
        .iter()
        .filter(|e| e.direction == FlowDirection::Payable && e.status != SettlementStatus::Paid)
        .map(|e| e.amount)
        .sum();

    let days_of_cash = if settled_balance > 0.0 {
        let daily_burn = open_payables / 30.0;
        let daily_burn = if daily_burn == 0.0 { 1.0 } else { daily_burn };
        (settled_balance / daily_burn).floor() as i64
    } else {
        0
    };

    let overdue_count = entries
        .iter()
        .filter(|e| e.status == SettlementStatus::Late)
        .count();

    CashflowSummary {
        settled_balance,
        due_next_30_days,
        days_of_cash,
        overdue_count,
    }
}
