use std::collections::BTreeMap;
use std::fmt;

use bgt_common::{format_numeric, is_blank, normalize_text};
use serde::{Deserialize, Serialize};

static MISSING: CellValue = CellValue::Missing;

/// A single spreadsheet cell after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Missing,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Missing, or text that normalizes to the empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Text(text) => is_blank(text),
            Self::Number(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(value) => f.write_str(&format_numeric(*value)),
            Self::Missing => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Normalized text rendering of a cell, used for every comparison.
///
/// Numbers render without a trailing `.0` so that `1.0` compares equal to the
/// text `"1"`.
pub fn normalize_cell(value: &CellValue) -> String {
    match value {
        CellValue::Text(text) => normalize_text(text),
        CellValue::Number(number) => format_numeric(*number),
        CellValue::Missing => String::new(),
    }
}

/// One canonical row, keyed by field name.
///
/// Column order lives on the owning [`Table`]; absent keys read as
/// [`CellValue::Missing`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub cells: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> &CellValue {
        self.cells.get(field).unwrap_or(&MISSING)
    }

    pub fn set(&mut self, field: impl Into<String>, value: CellValue) {
        self.cells.insert(field.into(), value);
    }

    pub fn contains(&self, field: &str) -> bool {
        self.cells.contains_key(field)
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// An ordered set of columns plus rows keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Appends `name` to the column list when absent. Returns true if added.
    pub fn ensure_column(&mut self, name: &str) -> bool {
        if self.has_column(name) {
            return false;
        }
        self.columns.push(name.to_string());
        true
    }
}
