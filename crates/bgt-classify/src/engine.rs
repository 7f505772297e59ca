//! Ordered rule fold, fallback defaults and amount coercion.

use std::collections::BTreeMap;

use bgt_common::parse_amount;
use bgt_model::{CellValue, ClassificationRule, FallbackDefaults, Row};

use crate::condition::condition_holds;

/// What happened to one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationOutcome {
    /// Indices of matching rules, in rule order.
    pub matched_rules: Vec<usize>,
    /// Fields that received their fallback default.
    pub fallback_fields: Vec<String>,
}

/// Classifies one row.
///
/// Every rule is evaluated against the incoming row in order; each match
/// writes all of its assignments into an accumulator, so the last matching
/// rule wins per field. Fallback defaults then fill fields no rule assigned
/// whose value is missing or blank.
pub fn classify(
    row: Row,
    rules: &[ClassificationRule],
    fallback: &FallbackDefaults,
) -> (Row, ClassificationOutcome) {
    let (assigned, matched_rules) = rules.iter().enumerate().fold(
        (BTreeMap::<&str, &CellValue>::new(), Vec::new()),
        |(mut assigned, mut matched), (index, rule)| {
            if condition_holds(&rule.condition, &row) {
                for assignment in &rule.assignments {
                    assigned.insert(assignment.field.as_str(), &assignment.value);
                }
                matched.push(index);
            }
            (assigned, matched)
        },
    );

    let mut classified = row.clone();
    for (field, value) in &assigned {
        classified.set(*field, (*value).clone());
    }

    let mut fallback_fields = Vec::new();
    for (field, default) in fallback {
        if assigned.contains_key(field.as_str()) || !classified.get(field).is_blank() {
            continue;
        }
        classified.set(field.clone(), default.clone());
        fallback_fields.push(field.clone());
    }

    (
        classified,
        ClassificationOutcome {
            matched_rules,
            fallback_fields,
        },
    )
}

/// Parses the amount field in place; unparseable or empty values become
/// `Missing`, never zero.
pub fn coerce_amount(row: &mut Row, amount_field: &str) {
    let value = match row.get(amount_field) {
        CellValue::Number(number) if number.is_finite() => CellValue::Number(*number),
        CellValue::Text(text) => parse_amount(text).map_or(CellValue::Missing, CellValue::Number),
        _ => CellValue::Missing,
    };
    row.set(amount_field, value);
}
