//! Per-row validation checks producing quality log entries.

use std::collections::BTreeMap;

use bgt_common::parse_amount;
use bgt_model::{CellValue, QualityLogEntry, Row, SOURCE_ROW_COLUMN, Table};
use serde::{Deserialize, Serialize};

/// Checks configured per canonical column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationChecks {
    /// Column → maximum number of decimal places.
    pub decimal_places: BTreeMap<String, u32>,
    pub non_negative: Vec<String>,
    pub not_null: Vec<String>,
}

impl ValidationChecks {
    pub fn is_empty(&self) -> bool {
        self.decimal_places.is_empty() && self.non_negative.is_empty() && self.not_null.is_empty()
    }
}

/// A violated check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    Decimals(u32),
    NonNegative,
    NotNull,
}

impl ValidationRule {
    pub fn name(self) -> String {
        match self {
            Self::Decimals(places) => format!("decimals_{places}"),
            Self::NonNegative => "non_negative".to_string(),
            Self::NotNull => "not_null".to_string(),
        }
    }
}

/// Text amounts may still carry thousands separators.
fn numeric(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(number) => Some(*number),
        CellValue::Text(text) => parse_amount(text),
        CellValue::Missing => None,
    }
}

fn exceeds_places(value: f64, places: u32) -> bool {
    let factor = 10f64.powi(places as i32);
    let rounded = (value * factor).round() / factor;
    (rounded - value).abs() > f64::EPSILON * value.abs().max(1.0)
}

fn row_number(row: &Row, index: usize) -> usize {
    match row.get(SOURCE_ROW_COLUMN) {
        CellValue::Number(number) if *number >= 1.0 => *number as usize,
        _ => index + 1,
    }
}

/// Runs every configured check over `table`.
///
/// Columns absent from the table are skipped. Entries are ordered by check
/// kind (decimals, non-negative, not-null), then column, then row.
pub fn validate_rows(
    table: &Table,
    checks: &ValidationChecks,
    source_file: &str,
) -> Vec<QualityLogEntry> {
    let mut entries = Vec::new();
    let mut record = |index: usize, row: &Row, column: &str, rule: ValidationRule| {
        entries.push(QualityLogEntry {
            source_file: source_file.to_string(),
            row: row_number(row, index),
            column: column.to_string(),
            rule: rule.name(),
            value: row.get(column).to_string(),
        });
    };

    for (column, places) in &checks.decimal_places {
        if !table.has_column(column) {
            continue;
        }
        for (index, row) in table.rows.iter().enumerate() {
            if numeric(row.get(column)).is_some_and(|v| exceeds_places(v, *places)) {
                record(index, row, column, ValidationRule::Decimals(*places));
            }
        }
    }

    for column in &checks.non_negative {
        if !table.has_column(column) {
            continue;
        }
        for (index, row) in table.rows.iter().enumerate() {
            if numeric(row.get(column)).is_some_and(|v| v < 0.0) {
                record(index, row, column, ValidationRule::NonNegative);
            }
        }
    }

    for column in &checks.not_null {
        if !table.has_column(column) {
            continue;
        }
        for (index, row) in table.rows.iter().enumerate() {
            if row.get(column).is_blank() {
                record(index, row, column, ValidationRule::NotNull);
            }
        }
    }

    entries
}
