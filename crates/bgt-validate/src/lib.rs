#![deny(unsafe_code)]

//! Data-quality checks: per-row validation (the quality log), the aggregate
//! quality gate, and strict-mode per-file gating.

pub mod checks;
pub mod gate;

use std::collections::BTreeSet;

use bgt_model::QualityLogEntry;

pub use checks::{ValidationChecks, ValidationRule, validate_rows};
pub use gate::{
    DEFAULT_CATEGORY_FIELD, DEFAULT_UNKNOWN_VALUE, QualityGateSettings, check_quality,
};

/// Files whose rows must be withheld from the master output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatingDecision {
    pub block_files: bool,
    pub blocking_files: Vec<String>,
}

impl GatingDecision {
    pub fn is_blocked(&self, file: &str) -> bool {
        self.blocking_files.iter().any(|f| f == file)
    }
}

/// In strict mode every file with at least one quality log entry is blocked.
pub fn gate_strict_files(strict: bool, entries: &[QualityLogEntry]) -> GatingDecision {
    if !strict {
        return GatingDecision::default();
    }
    let blocking: BTreeSet<&str> = entries
        .iter()
        .map(|entry| entry.source_file.as_str())
        .collect();
    GatingDecision {
        block_files: !blocking.is_empty(),
        blocking_files: blocking.into_iter().map(String::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(file: &str) -> QualityLogEntry {
        QualityLogEntry {
            source_file: file.to_string(),
            row: 1,
            column: "p_total_bud".to_string(),
            rule: "non_negative".to_string(),
            value: "-50".to_string(),
        }
    }

    #[test]
    fn lenient_mode_never_blocks() {
        let decision = gate_strict_files(false, &[entry("a.xlsx")]);
        assert!(!decision.block_files);
    }

    #[test]
    fn strict_mode_blocks_each_offending_file_once() {
        let decision = gate_strict_files(true, &[entry("b.xlsx"), entry("a.xlsx"), entry("b.xlsx")]);
        assert!(decision.block_files);
        assert_eq!(decision.blocking_files, ["a.xlsx", "b.xlsx"]);
        assert!(decision.is_blocked("a.xlsx"));
        assert!(!decision.is_blocked("c.xlsx"));
    }
}
