//! Pure evaluation of rule conditions against a row.

use bgt_model::{Clause, Condition, Matcher, Row, normalize_cell};

fn matcher_holds(matcher: &Matcher, value: &str) -> bool {
    match matcher {
        Matcher::Equals { value: target } => value == target,
        Matcher::EqualsAny { values } => values.iter().any(|target| target == value),
        Matcher::ContainsAny { keywords } => keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && value.contains(keyword.as_str())),
    }
}

/// A clause holds when any of its matchers holds for the normalized field
/// value. An absent field reads as the empty string.
pub fn clause_holds(clause: &Clause, row: &Row) -> bool {
    let value = normalize_cell(row.get(&clause.field));
    clause
        .matchers
        .iter()
        .any(|matcher| matcher_holds(matcher, &value))
}

pub fn condition_holds(condition: &Condition, row: &Row) -> bool {
    match condition {
        Condition::Clause(clause) => clause_holds(clause, row),
        Condition::AnyOf(clauses) => clauses.iter().any(|clause| clause_holds(clause, row)),
    }
}
