//! Aggregate quality gate over the classified table.

use bgt_common::normalize_text;
use bgt_model::{CellValue, QualityReport, QualityThresholds, Table, normalize_cell};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_CATEGORY_FIELD: &str = "budget_group";
pub const DEFAULT_UNKNOWN_VALUE: &str = "ไม่ทราบหมวด";

/// Which column and sentinel identify unclassified rows, and the amount column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityGateSettings {
    pub amount_field: String,
    pub category_field: String,
    pub unknown_value: String,
    pub thresholds: QualityThresholds,
}

impl Default for QualityGateSettings {
    fn default() -> Self {
        Self {
            amount_field: "p_total_bud".to_string(),
            category_field: DEFAULT_CATEGORY_FIELD.to_string(),
            unknown_value: DEFAULT_UNKNOWN_VALUE.to_string(),
            thresholds: QualityThresholds::default(),
        }
    }
}

impl QualityGateSettings {
    /// True when the row's category is the unknown sentinel.
    pub fn is_unknown(&self, category: &CellValue) -> bool {
        normalize_cell(category) == normalize_text(&self.unknown_value)
    }
}

fn amount(value: &CellValue) -> Option<f64> {
    value.as_number().filter(|v| v.is_finite())
}

/// Computes the aggregate statistics and verdict.
///
/// The unknown ratio is the unknown-category share of the total amount
/// (missing amounts count as zero; a zero total gives ratio zero). The
/// non-null ratio is the share of rows with an amount (an empty table gives
/// one). Every failing check contributes a message.
pub fn check_quality(table: &Table, settings: &QualityGateSettings) -> QualityReport {
    let mut total_amount = 0.0;
    let mut unknown_amount = 0.0;
    let mut nonnull = 0usize;
    let mut negative_count = 0usize;

    for row in &table.rows {
        let value = amount(row.get(&settings.amount_field));
        if let Some(v) = value {
            nonnull += 1;
            total_amount += v;
            if v < 0.0 {
                negative_count += 1;
            }
            if settings.is_unknown(row.get(&settings.category_field)) {
                unknown_amount += v;
            }
        }
    }

    let total_rows = table.len();
    let unknown_ratio = if total_amount == 0.0 {
        0.0
    } else {
        unknown_amount / total_amount
    };
    let nonnull_ratio = if total_rows == 0 {
        1.0
    } else {
        nonnull as f64 / total_rows as f64
    };

    let thresholds = settings.thresholds;
    let mut messages = Vec::new();
    if unknown_ratio > thresholds.unknown_max {
        messages.push(format!(
            "unknown category ratio {:.4} exceeds maximum {:.4} ({} = {})",
            unknown_ratio, thresholds.unknown_max, settings.category_field, settings.unknown_value
        ));
    }
    if nonnull_ratio < thresholds.nonnull_min {
        messages.push(format!(
            "non-null {} ratio {:.4} is below minimum {:.4}",
            settings.amount_field, nonnull_ratio, thresholds.nonnull_min
        ));
    }
    if negative_count > 0 {
        messages.push(format!(
            "{negative_count} row(s) with negative {}",
            settings.amount_field
        ));
    }

    let passed = messages.is_empty();
    if passed {
        info!(
            rows = total_rows,
            unknown_ratio,
            nonnull_ratio,
            "quality gate passed"
        );
    } else {
        for message in &messages {
            warn!(message = %message, "quality gate check failed");
        }
    }

    QualityReport {
        total_rows,
        total_amount,
        unknown_amount,
        unknown_ratio,
        nonnull_ratio,
        negative_count,
        thresholds,
        passed,
        messages,
    }
}
