#![deny(unsafe_code)]

//! Classification of canonical budget rows.
//!
//! Rows pass through an ordered rule fold (last matching rule wins per
//! field), fallback defaults for fields no rule set, amount coercion and
//! finally derived column computation.

pub mod condition;
pub mod derived;
pub mod engine;

use std::collections::BTreeMap;

use bgt_model::{ClassificationRule, DerivedColumn, FallbackDefaults, Table};
use tracing::{debug, info};

pub use condition::{clause_holds, condition_holds};
pub use derived::{apply_derived, derive_value, ensure_columns};
pub use engine::{ClassificationOutcome, classify, coerce_amount};

/// Default name of the amount column.
pub const DEFAULT_AMOUNT_FIELD: &str = "p_total_bud";

/// Everything needed to classify a table.
#[derive(Debug, Clone, Default)]
pub struct ClassifierSettings {
    pub rules: Vec<ClassificationRule>,
    pub fallback: FallbackDefaults,
    pub amount_field: String,
    pub required_columns: Vec<String>,
    pub derived_columns: Vec<DerivedColumn>,
}

/// Counts collected while classifying a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationSummary {
    pub rows: usize,
    /// Rows matched per rule label.
    pub rule_hits: BTreeMap<String, usize>,
    /// Rows that received a fallback value, per field.
    pub fallback_hits: BTreeMap<String, usize>,
    /// Rows no rule matched.
    pub unmatched_rows: usize,
}

impl ClassifierSettings {
    /// Columns every classified table must carry: required columns, fallback
    /// fields, rule targets, the amount field and derived columns.
    pub fn output_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        let candidates = self
            .required_columns
            .iter()
            .map(String::as_str)
            .chain(self.fallback.keys().map(String::as_str))
            .chain(self.rules.iter().flat_map(ClassificationRule::assigned_fields))
            .chain(std::iter::once(self.amount_field.as_str()))
            .chain(self.derived_columns.iter().map(|column| column.name.as_str()));
        for name in candidates {
            if !name.is_empty() && !fields.contains(&name) {
                fields.push(name);
            }
        }
        fields
    }
}

/// Classifies every row of `table` in place.
pub fn classify_table(table: &mut Table, settings: &ClassifierSettings) -> ClassificationSummary {
    let added = ensure_columns(table, settings.output_fields());
    if !added.is_empty() {
        debug!(columns = ?added, "added missing columns");
    }

    let mut summary = ClassificationSummary {
        rows: table.len(),
        ..ClassificationSummary::default()
    };
    let rows = std::mem::take(&mut table.rows);
    table.rows = rows
        .into_iter()
        .map(|row| {
            let (mut row, outcome) = classify(row, &settings.rules, &settings.fallback);
            if outcome.matched_rules.is_empty() {
                summary.unmatched_rows += 1;
            }
            for index in &outcome.matched_rules {
                if let Some(rule) = settings.rules.get(*index) {
                    *summary.rule_hits.entry(rule.label(*index)).or_default() += 1;
                }
            }
            for field in outcome.fallback_fields {
                *summary.fallback_hits.entry(field).or_default() += 1;
            }
            coerce_amount(&mut row, &settings.amount_field);
            apply_derived(&mut row, &settings.derived_columns);
            row
        })
        .collect();

    info!(
        rows = summary.rows,
        unmatched = summary.unmatched_rows,
        rules = settings.rules.len(),
        "classified rows"
    );
    summary
}
