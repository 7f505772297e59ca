use serde::{Deserialize, Serialize};

pub const DEFAULT_UNKNOWN_MAX: f64 = 0.02;
pub const DEFAULT_NONNULL_MIN: f64 = 0.95;

/// Limits the aggregate quality gate checks against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Maximum share of the total amount allowed in the unknown category.
    pub unknown_max: f64,
    /// Minimum share of rows that must carry an amount.
    pub nonnull_min: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            unknown_max: DEFAULT_UNKNOWN_MAX,
            nonnull_min: DEFAULT_NONNULL_MIN,
        }
    }
}

/// Aggregate statistics and verdict for a classified table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_rows: usize,
    pub total_amount: f64,
    pub unknown_amount: f64,
    pub unknown_ratio: f64,
    pub nonnull_ratio: f64,
    pub negative_count: usize,
    pub thresholds: QualityThresholds,
    pub passed: bool,
    pub messages: Vec<String>,
}

/// One per-row validation violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityLogEntry {
    pub source_file: String,
    /// 1-based data row within the source file.
    pub row: usize,
    pub column: String,
    /// `decimals_<n>`, `non_negative` or `not_null`.
    pub rule: String,
    pub value: String,
}

/// Outcome of one input file in a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub file: String,
    pub exported: bool,
    pub reason: Option<String>,
    /// Headers that matched no canonical field and passed through verbatim.
    pub unknown_headers: Vec<String>,
    pub issues_count: usize,
    pub rows: usize,
    pub sheet: Option<String>,
}

impl FileOutcome {
    pub fn skipped(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            exported: false,
            reason: Some(reason.into()),
            ..Self::default()
        }
    }
}
