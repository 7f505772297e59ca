//! Numeric coercion of text columns.

use bgt_common::{parse_f64, strip_thousands};
use bgt_model::{CellValue, SOURCE_FILE_COLUMN, SOURCE_ROW_COLUMN, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_NUMERIC_MIN_COUNT: usize = 5;
pub const DEFAULT_NUMERIC_MIN_RATIO: f64 = 0.02;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericCoercion {
    /// Floor for the number of parseable cells a column needs.
    pub min_count: usize,
    /// Share of the row count a column needs, when larger than the floor.
    pub min_ratio: f64,
    /// Columns whose values may carry a trailing `%`.
    pub percent_columns: Vec<String>,
}

impl Default for NumericCoercion {
    fn default() -> Self {
        Self {
            min_count: DEFAULT_NUMERIC_MIN_COUNT,
            min_ratio: DEFAULT_NUMERIC_MIN_RATIO,
            percent_columns: Vec::new(),
        }
    }
}

impl NumericCoercion {
    /// Parseable cells required for a table of `row_count` rows.
    pub fn threshold(&self, row_count: usize) -> usize {
        let by_ratio = (row_count as f64 * self.min_ratio).floor() as usize;
        self.min_count.max(by_ratio)
    }
}

fn parse_cell(cell: &CellValue, strip_percent: bool) -> Option<f64> {
    match cell {
        CellValue::Number(value) => Some(*value),
        CellValue::Text(text) => parse_f64(&strip_thousands(text, strip_percent)),
        CellValue::Missing => None,
    }
}

/// Converts text columns that are predominantly numeric.
///
/// A column is considered when it holds at least one text cell. When enough
/// cells parse (see [`NumericCoercion::threshold`]) the whole column becomes
/// numeric and unparseable cells become `Missing`. Returns the converted
/// column names.
pub fn coerce_numeric_columns(table: &mut Table, options: &NumericCoercion) -> Vec<String> {
    let threshold = options.threshold(table.len());
    let mut converted = Vec::new();

    for column in &table.columns {
        if column == SOURCE_FILE_COLUMN || column == SOURCE_ROW_COLUMN {
            continue;
        }
        let has_text = table
            .rows
            .iter()
            .any(|row| matches!(row.get(column), CellValue::Text(_)));
        if !has_text {
            continue;
        }

        let strip_percent = options.percent_columns.iter().any(|c| c == column);
        let parsed = table
            .rows
            .iter()
            .filter(|row| parse_cell(row.get(column), strip_percent).is_some())
            .count();
        if parsed < threshold {
            continue;
        }

        for row in &mut table.rows {
            if row.get(column).is_missing() {
                continue;
            }
            let value = match parse_cell(row.get(column), strip_percent) {
                Some(number) => CellValue::Number(number),
                None => CellValue::Missing,
            };
            row.set(column.clone(), value);
        }
        debug!(column = %column, parsed, threshold, "coerced numeric column");
        converted.push(column.clone());
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgt_model::Row;

    fn table(values: &[&str]) -> Table {
        let mut table = Table::new(vec!["p_total_bud".to_string()]);
        for value in values {
            let cell = if value.is_empty() {
                CellValue::Missing
            } else {
                CellValue::text(*value)
            };
            table.push_row(Row::from_iter([("p_total_bud", cell)]));
        }
        table
    }

    #[test]
    fn threshold_uses_floor_and_ratio() {
        let options = NumericCoercion::default();
        assert_eq!(options.threshold(10), 5);
        assert_eq!(options.threshold(1000), 20);
        assert_eq!(options.threshold(349), 6);
    }

    #[test]
    fn converts_when_enough_cells_parse() {
        let mut t = table(&["1,000", "2,500.5", "3", "4", "5", "รวม", ""]);
        let converted = coerce_numeric_columns(&mut t, &NumericCoercion::default());
        assert_eq!(converted, ["p_total_bud"]);
        assert_eq!(t.rows[0].get("p_total_bud"), &CellValue::Number(1000.0));
        assert_eq!(t.rows[1].get("p_total_bud"), &CellValue::Number(2500.5));
        assert!(t.rows[5].get("p_total_bud").is_missing());
        assert!(t.rows[6].get("p_total_bud").is_missing());
    }

    #[test]
    fn leaves_sparse_columns_alone() {
        let mut t = table(&["1", "2", "3", "4", "x"]);
        let converted = coerce_numeric_columns(&mut t, &NumericCoercion::default());
        assert!(converted.is_empty());
        assert_eq!(t.rows[0].get("p_total_bud"), &CellValue::text("1"));
    }

    #[test]
    fn percent_columns_strip_the_sign() {
        let mut t = table(&["10%", "20%", "30%", "40%", "50%"]);
        let options = NumericCoercion {
            percent_columns: vec!["p_total_bud".to_string()],
            ..NumericCoercion::default()
        };
        assert_eq!(coerce_numeric_columns(&mut t, &options).len(), 1);
        assert_eq!(t.rows[4].get("p_total_bud"), &CellValue::Number(50.0));
    }
}
