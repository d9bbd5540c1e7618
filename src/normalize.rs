//! Cell-level value normalization.
//!
//! Spreadsheet exports deliver amounts as currency strings ("R$ 1.234,56"),
//! plain numbers, or garbage, and months as Portuguese names in whatever
//! capitalization the sheet author used. Everything here degrades silently:
//! unparseable amounts become `0.0` and unknown month names become ordinal
//! `0`, so a bad cell shrinks a chart instead of killing an upload.

use chrono::NaiveDate;
use log::debug;
use serde_json::Value;

const MONTH_NAMES: [(&str, &str); 12] = [
    ("janeiro", "jan"),
    ("fevereiro", "fev"),
    ("marco", "mar"),
    ("abril", "abr"),
    ("maio", "mai"),
    ("junho", "jun"),
    ("julho", "jul"),
    ("agosto", "ago"),
    ("setembro", "set"),
    ("outubro", "out"),
    ("novembro", "nov"),
    ("dezembro", "dez"),
];

/// Lowercases and strips the accents that show up in Portuguese headers and
/// month names, so "Março" and "marco" compare equal.
pub fn fold_label(raw: &str) -> String {
    raw.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Resolves a Portuguese month name (or 3-letter abbreviation) to its
/// ordinal 1..=12. Unrecognized names map to `0`, which sorts before every
/// real month; callers treat that as "label of unknown position", not as an
/// error.
pub fn month_ordinal(name: &str) -> u32 {
    let needle = fold_label(name);
    for (index, (full, abbreviation)) in MONTH_NAMES.iter().enumerate() {
        if needle == *full || needle == *abbreviation {
            return index as u32 + 1;
        }
    }
    0
}

/// Parses a raw cell into a signed amount.
///
/// Accepts JSON numbers directly. Strings are cleaned of currency symbols,
/// whitespace and thousands separators, accepting both `,` and `.` as the
/// decimal marker (when both appear, the rightmost one wins). Anything that
/// still fails to parse yields `0.0`.
pub fn parse_amount(raw: &Value) -> f64 {
    match raw {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_amount_str(s),
        _ => 0.0,
    }
}

fn parse_amount_str(raw: &str) -> f64 {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | '.' | ','))
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }

    let dots = cleaned.matches('.').count();
    let commas = cleaned.matches(',').count();

    if dots > 0 && commas > 0 {
        // Rightmost separator is the decimal marker, the other is grouping.
        let decimal_is_comma = cleaned.rfind(',') > cleaned.rfind('.');
        if decimal_is_comma {
            cleaned.retain(|c| c != '.');
            cleaned = cleaned.replace(',', ".");
        } else {
            cleaned.retain(|c| c != ',');
        }
    } else if commas == 1 {
        cleaned = cleaned.replace(',', ".");
    } else if commas > 1 {
        cleaned.retain(|c| c != ',');
    } else if dots > 1 {
        cleaned.retain(|c| c != '.');
    }

    match cleaned.parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            debug!("could not parse amount cell '{raw}', treating as 0");
            0.0
        }
    }
}

/// Parses a balance-sheet as-of cell. Sheets exported from Brazilian tools
/// carry `DD/MM/YYYY`; API fetches carry ISO dates.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for format in ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    None
}
