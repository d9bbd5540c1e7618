//! Distinct-value catalog and the snapshot surface.
//!
//! `DataCatalog` summarizes a classified record set for the filter UI
//! (which companies/months/categories exist to select from) and renders the
//! same summary as JSON, CSV or Markdown for inspection. The snapshot
//! helpers serialize a normalized record list for the persistence
//! collaborator; they are the only fallible surface of the crate.

use crate::aggregate::{distinct, sorted_month_labels};
use crate::error::Result;
use crate::schema::{ExpenseRecord, TransactionRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCatalog {
    /// Companies in first-seen order.
    pub companies: Vec<String>,
    /// Month labels in ordinal order.
    pub months: Vec<String>,
    /// Categories in alphabetical order.
    pub categories: Vec<String>,
    /// Subcategories in alphabetical order; blank values excluded.
    pub subcategories: Vec<String>,
    pub record_count: usize,
}

impl DataCatalog {
    pub fn from_transactions(records: &[TransactionRecord]) -> Self {
        let mut categories = distinct(records.iter().map(|r| r.category.as_str()));
        categories.sort();

        let mut subcategories = distinct(
            records
                .iter()
                .filter_map(|r| r.subcategory.as_deref())
                .filter(|s| !s.is_empty()),
        );
        subcategories.sort();

        Self {
            companies: distinct(records.iter().map(|r| r.company.as_str())),
            months: sorted_month_labels(records.iter().map(|r| r.month_label.as_str())),
            categories,
            subcategories,
            record_count: records.len(),
        }
    }

    pub fn from_expenses(records: &[ExpenseRecord]) -> Self {
        let mut categories = distinct(records.iter().map(|r| r.category.as_str()));
        categories.sort();

        let mut subcategories = distinct(
            records
                .iter()
                .map(|r| r.subcategory.as_str())
                .filter(|s| !s.is_empty()),
        );
        subcategories.sort();

        Self {
            companies: distinct(records.iter().map(|r| r.company.as_str())),
            months: sorted_month_labels(records.iter().map(|r| r.month_label.as_str())),
            categories,
            subcategories,
            record_count: records.len(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("Section,Value\n");

        for company in &self.companies {
            output.push_str(&format!("Company,{}\n", company));
        }
        for month in &self.months {
            output.push_str(&format!("Month,{}\n", month));
        }
        for category in &self.categories {
            output.push_str(&format!("Category,{}\n", category));
        }
        for subcategory in &self.subcategories {
            output.push_str(&format!("Subcategory,{}\n", subcategory));
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Loaded data ({} records)\n\n", self.record_count));

        output.push_str("## Companies\n\n");
        for company in &self.companies {
            output.push_str(&format!("- {}\n", company));
        }
        output.push('\n');

        output.push_str("## Months\n\n");
        for month in &self.months {
            output.push_str(&format!("- {}\n", month));
        }
        output.push('\n');

        output.push_str("## Categories\n\n");
        for category in &self.categories {
            output.push_str(&format!("- {}\n", category));
        }
        output.push('\n');

        if !self.subcategories.is_empty() {
            output.push_str("## Subcategories\n\n");
            for subcategory in &self.subcategories {
                output.push_str(&format!("- {}\n", subcategory));
            }
            output.push('\n');
        }

        output
    }
}

/// Serializes a record list for opaque storage by the persistence
/// collaborator.
pub fn snapshot_to_json<T: Serialize>(records: &[T]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// Restores a record list from a stored snapshot.
pub fn snapshot_from_json<T: DeserializeOwned>(json: &str) -> Result<Vec<T>> {
    Ok(serde_json::from_str(json)?)
}

/// Streams a snapshot into a writer.
pub fn write_snapshot<W: Write, T: Serialize>(writer: &mut W, records: &[T]) -> Result<()> {
    let json = snapshot_to_json(records)?;
    writer.write_all(json.as_bytes())?;
    Ok(())
}
