//! Per-dashboard filter scope.
//!
//! Every aggregation is a pure function of (records, scope). Setters do not
//! validate that a selected company or month exists in the loaded data;
//! selecting a nonexistent value simply yields empty filtered results.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompanyFilter {
    #[default]
    All,
    Only(String),
}

impl CompanyFilter {
    fn allows(&self, company: &str) -> bool {
        match self {
            CompanyFilter::All => true,
            CompanyFilter::Only(selected) => selected == company,
        }
    }
}

/// The (company, months, categories) triple restricting which records
/// participate in aggregation. Empty month/category selections mean "no
/// restriction".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterScope {
    pub company: CompanyFilter,
    pub months: Vec<String>,
    pub categories: Vec<String>,
}

impl FilterScope {
    pub fn all() -> Self {
        Self::default()
    }

    /// Resets to the state every board adopts on a fresh load: all
    /// companies, the full set of month labels present in the new data, and
    /// no category restriction.
    pub fn reset(&mut self, months: Vec<String>) {
        self.company = CompanyFilter::All;
        self.months = months;
        self.categories.clear();
    }

    pub fn set_company(&mut self, company: CompanyFilter) {
        self.company = company;
    }

    pub fn set_months(&mut self, months: Vec<String>) {
        self.months = months;
    }

    pub fn set_categories(&mut self, categories: Vec<String>) {
        self.categories = categories;
    }

    pub fn allows(&self, company: &str, month_label: &str, category: &str) -> bool {
        self.company.allows(company)
            && (self.months.is_empty() || self.months.iter().any(|m| m == month_label))
            && (self.categories.is_empty() || self.categories.iter().any(|c| c == category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scope_allows_everything() {
        let scope = FilterScope::all();
        assert!(scope.allows("Alpha", "Janeiro", "Pessoal"));
        assert!(scope.allows("Beta", "Janvier", ""));
    }

    #[test]
    fn test_company_restriction() {
        let mut scope = FilterScope::all();
        scope.set_company(CompanyFilter::Only("Alpha".to_string()));
        assert!(scope.allows("Alpha", "Janeiro", "Pessoal"));
        assert!(!scope.allows("Beta", "Janeiro", "Pessoal"));
    }

    #[test]
    fn test_month_and_category_restrictions() {
        let mut scope = FilterScope::all();
        scope.set_months(vec!["Janeiro".to_string()]);
        scope.set_categories(vec!["Pessoal".to_string()]);

        assert!(scope.allows("Alpha", "Janeiro", "Pessoal"));
        assert!(!scope.allows("Alpha", "Fevereiro", "Pessoal"));
        assert!(!scope.allows("Alpha", "Janeiro", "Marketing"));
    }

    #[test]
    fn test_nonexistent_selection_just_matches_nothing() {
        let mut scope = FilterScope::all();
        scope.set_company(CompanyFilter::Only("Nobody".to_string()));
        assert!(!scope.allows("Alpha", "Janeiro", "Pessoal"));
    }

    #[test]
    fn test_reset_restores_load_state() {
        let mut scope = FilterScope::all();
        scope.set_company(CompanyFilter::Only("Alpha".to_string()));
        scope.set_categories(vec!["Pessoal".to_string()]);

        scope.reset(vec!["Janeiro".to_string(), "Fevereiro".to_string()]);

        assert_eq!(scope.company, CompanyFilter::All);
        assert_eq!(scope.months.len(), 2);
        assert!(scope.categories.is_empty());
    }
}
