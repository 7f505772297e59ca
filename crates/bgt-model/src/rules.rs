//! Classification rules, fallback defaults and derived column definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::CellValue;

/// A single test against the normalized value of a field.
///
/// Targets are stored already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Matcher {
    Equals { value: String },
    EqualsAny { values: Vec<String> },
    ContainsAny { keywords: Vec<String> },
}

impl Matcher {
    /// Evaluation priority; lower runs first.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Equals { .. } => 0,
            Self::EqualsAny { .. } => 1,
            Self::ContainsAny { .. } => 2,
        }
    }
}

/// A field plus the matchers tested against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub field: String,
    pub matchers: Vec<Matcher>,
}

impl Clause {
    /// Builds a clause with matchers sorted into evaluation priority.
    pub fn new(field: impl Into<String>, mut matchers: Vec<Matcher>) -> Self {
        matchers.sort_by_key(Matcher::priority);
        Self {
            field: field.into(),
            matchers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "clauses", rename_all = "snake_case")]
pub enum Condition {
    Clause(Clause),
    AnyOf(Vec<Clause>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub field: String,
    pub value: CellValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub name: Option<String>,
    pub condition: Condition,
    pub assignments: Vec<Assignment>,
}

impl ClassificationRule {
    /// Name used in logs: the configured name or `#<index>`.
    pub fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("#{index}"))
    }

    pub fn assigned_fields(&self) -> impl Iterator<Item = &str> {
        self.assignments.iter().map(|a| a.field.as_str())
    }
}

/// Field → default value, applied only to fields no rule assigned.
pub type FallbackDefaults = BTreeMap<String, CellValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivedOp {
    Concat {
        fields: Vec<String>,
        separator: String,
    },
    Sum {
        fields: Vec<String>,
    },
    Ratio {
        numerator: String,
        denominator: String,
    },
}

/// A column computed from other columns after classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedColumn {
    pub name: String,
    pub op: DerivedOp,
    /// Decimal places for numeric results.
    pub round: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clause_sorts_matchers_by_priority() {
        let clause = Clause::new(
            "plan_name",
            vec![
                Matcher::ContainsAny {
                    keywords: vec!["บุคลากร".to_string()],
                },
                Matcher::Equals {
                    value: "x".to_string(),
                },
            ],
        );
        assert_eq!(clause.matchers[0].priority(), 0);
        assert_eq!(clause.matchers[1].priority(), 2);
    }

    #[test]
    fn unnamed_rule_label_uses_index() {
        let rule = ClassificationRule {
            name: None,
            condition: Condition::AnyOf(vec![]),
            assignments: vec![],
        };
        assert_eq!(rule.label(3), "#3");
    }
}
