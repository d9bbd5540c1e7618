//! Balance-sheet totals, the balanced-books check and the derived
//! patrimonial ratios.

use crate::normalize::fold_label;
use crate::schema::{AccountGroup, AccountSubgroup, BalanceAccount};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAccount {
    pub name: String,
    pub code: String,
    pub group: AccountGroup,
    pub subgroup: AccountSubgroup,
    pub value: f64,
}

/// Top-N accounts by absolute balance plus how much of the total they cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRanking {
    pub entries: Vec<RankedAccount>,
    pub coverage_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolidityGrade {
    Strong,
    Moderate,
    Weak,
}

/// Share of total assets financed by each capital layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalStructure {
    pub equity_pct: f64,
    pub long_term_liability_pct: f64,
    pub short_term_liability_pct: f64,
    pub grade: SolidityGrade,
}

/// Read-only aggregation view over a (typically company-filtered) set of
/// balance accounts.
pub struct BalanceSheetView<'a> {
    accounts: &'a [BalanceAccount],
}

impl<'a> BalanceSheetView<'a> {
    pub fn new(accounts: &'a [BalanceAccount]) -> Self {
        Self { accounts }
    }

    /// Group total as the magnitude of the summed balances. Credit balances
    /// may be stored negative; totals are displayed positive.
    pub fn group_total(&self, group: AccountGroup) -> f64 {
        self.accounts
            .iter()
            .filter(|a| a.group == group)
            .map(|a| a.balance)
            .sum::<f64>()
            .abs()
    }

    pub fn subgroup_total(&self, group: AccountGroup, subgroup: AccountSubgroup) -> f64 {
        self.accounts
            .iter()
            .filter(|a| a.group == group && a.subgroup == subgroup)
            .map(|a| a.balance)
            .sum::<f64>()
            .abs()
    }

    /// The balanced-books check: Assets = Liabilities + Equity within one
    /// unit of currency. An empty account set is reported as NOT balanced —
    /// "no books" is not the same as "balanced books".
    pub fn is_balanced(&self) -> bool {
        if self.accounts.is_empty() {
            return false;
        }

        let assets = self.group_total(AccountGroup::Asset);
        let liabilities = self.group_total(AccountGroup::Liability);
        let equity = self.group_total(AccountGroup::Equity);

        (assets - (liabilities + equity)).abs() < 1.0
    }

    /// Current liabilities over current assets.
    ///
    /// NOTE: this is the INVERSE of the conventional current-ratio
    /// definition (current assets / current liabilities). The original
    /// report defines the indicator this way, so values BELOW 1.0 mean
    /// comfortable short-term coverage here. Preserved deliberately; do not
    /// "fix" without also migrating every interpretation threshold built on
    /// top of it.
    pub fn current_ratio(&self) -> f64 {
        let current_assets = self.subgroup_total(AccountGroup::Asset, AccountSubgroup::Current);
        if current_assets > 0.0 {
            self.subgroup_total(AccountGroup::Liability, AccountSubgroup::Current) / current_assets
        } else {
            0.0
        }
    }

    /// Liabilities as a percentage of assets.
    pub fn leverage_pct(&self) -> f64 {
        let assets = self.group_total(AccountGroup::Asset);
        if assets > 0.0 {
            self.group_total(AccountGroup::Liability) / assets * 100.0
        } else {
            0.0
        }
    }

    /// Equity as a percentage of assets.
    pub fn equity_pct(&self) -> f64 {
        let assets = self.group_total(AccountGroup::Asset);
        if assets > 0.0 {
            self.group_total(AccountGroup::Equity) / assets * 100.0
        } else {
            0.0
        }
    }

    /// Non-current assets as a percentage of total assets.
    pub fn long_term_concentration_pct(&self) -> f64 {
        let assets = self.group_total(AccountGroup::Asset);
        if assets > 0.0 {
            self.subgroup_total(AccountGroup::Asset, AccountSubgroup::NonCurrent) / assets * 100.0
        } else {
            0.0
        }
    }

    /// Accounts recognizable as cash, bank or short-term investment by name.
    pub fn cash_and_equivalents(&self) -> f64 {
        self.accounts
            .iter()
            .filter(|a| {
                let name = fold_label(&a.name);
                name.contains("caixa") || name.contains("banco") || name.contains("aplicacao")
            })
            .map(|a| a.balance.abs())
            .sum()
    }

    /// Cash and equivalents as a share of current assets.
    pub fn cash_share_of_current_pct(&self) -> f64 {
        let current_assets = self.subgroup_total(AccountGroup::Asset, AccountSubgroup::Current);
        if current_assets > 0.0 {
            self.cash_and_equivalents() / current_assets * 100.0
        } else {
            0.0
        }
    }

    /// The three financing layers as shares of total assets, graded on the
    /// equity share: above 50% strong, above 30% moderate, otherwise weak.
    pub fn capital_structure(&self) -> CapitalStructure {
        let assets = self.group_total(AccountGroup::Asset);

        let pct = |value: f64| {
            if assets > 0.0 {
                value / assets * 100.0
            } else {
                0.0
            }
        };

        let equity_pct = pct(self.group_total(AccountGroup::Equity));
        let long_term_liability_pct = pct(self.subgroup_total(
            AccountGroup::Liability,
            AccountSubgroup::NonCurrent,
        ));
        let short_term_liability_pct =
            pct(self.subgroup_total(AccountGroup::Liability, AccountSubgroup::Current));

        let grade = if equity_pct > 50.0 {
            SolidityGrade::Strong
        } else if equity_pct > 30.0 {
            SolidityGrade::Moderate
        } else {
            SolidityGrade::Weak
        };

        CapitalStructure {
            equity_pct,
            long_term_liability_pct,
            short_term_liability_pct,
            grade,
        }
    }

    /// Top-N accounts by absolute balance, optionally restricted to one
    /// group, with the share of the total they represent.
    pub fn rank_accounts(&self, group: Option<AccountGroup>, n: usize) -> AccountRanking {
        let pool: Vec<&BalanceAccount> = self
            .accounts
            .iter()
            .filter(|a| group.map_or(true, |g| a.group == g))
            .collect();

        let mut entries: Vec<RankedAccount> = pool
            .iter()
            .map(|a| RankedAccount {
                name: a.name.clone(),
                code: a.code.clone(),
                group: a.group,
                subgroup: a.subgroup,
                value: a.balance.abs(),
            })
            .collect();
        entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
        entries.truncate(n);

        let total: f64 = pool.iter().map(|a| a.balance.abs()).sum();
        let ranked: f64 = entries.iter().map(|e| e.value).sum();

        AccountRanking {
            entries,
            coverage_pct: if total > 0.0 { ranked / total * 100.0 } else { 0.0 },
        }
    }
}
