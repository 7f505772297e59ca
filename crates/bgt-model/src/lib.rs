#![deny(unsafe_code)]

//! Core data types shared by the budget consolidation crates: cells, rows,
//! tables, classification rules and quality records.

pub mod quality;
pub mod rules;
pub mod table;

pub use quality::{
    DEFAULT_NONNULL_MIN, DEFAULT_UNKNOWN_MAX, FileOutcome, QualityLogEntry, QualityReport,
    QualityThresholds,
};
pub use rules::{
    Assignment, ClassificationRule, Clause, Condition, DerivedColumn, DerivedOp,
    FallbackDefaults, Matcher,
};
pub use table::{CellValue, Row, Table, normalize_cell};

/// Column holding the input file name of each ingested row.
pub const SOURCE_FILE_COLUMN: &str = "__source_file";
/// Column holding the 1-based data row within the input file.
pub const SOURCE_ROW_COLUMN: &str = "__source_row";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes() {
        let outcome = FileOutcome::skipped("a.xlsx", "no header row");
        let json = serde_json::to_string(&outcome).expect("serialize outcome");
        let round: FileOutcome = serde_json::from_str(&json).expect("deserialize outcome");
        assert_eq!(round.file, "a.xlsx");
        assert!(!round.exported);
    }

    #[test]
    fn default_thresholds() {
        let thresholds = QualityThresholds::default();
        assert_eq!(thresholds.unknown_max, 0.02);
        assert_eq!(thresholds.nonnull_min, 0.95);
    }
}
