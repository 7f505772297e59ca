//! Values captured from the title rows above a table's header.
//!
//! Provincial exports print the province once in a banner such as
//! `จังหวัด 10 กรุงเทพมหานคร`; a title pattern lifts its code and name onto
//! every data row.

use bgt_model::{CellValue, normalize_cell};
use regex::Regex;
use tracing::debug;

use crate::error::{IngestError, Result};

/// A regex with two capture groups, written to a code and a name column.
#[derive(Debug, Clone)]
pub struct TitlePattern {
    regex: Regex,
    code_column: String,
    name_column: String,
}

impl TitlePattern {
    pub fn new(pattern: &str, code_column: &str, name_column: &str) -> Result<Self> {
        let invalid = |reason: String| IngestError::InvalidTitlePattern {
            pattern: pattern.to_string(),
            reason,
        };
        let regex = Regex::new(pattern).map_err(|err| invalid(err.to_string()))?;
        // Group 0 is the whole match.
        if regex.captures_len() < 3 {
            return Err(invalid("expected two capture groups".to_string()));
        }
        Ok(Self {
            regex,
            code_column: code_column.to_string(),
            name_column: name_column.to_string(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn code_column(&self) -> &str {
        &self.code_column
    }

    pub fn name_column(&self) -> &str {
        &self.name_column
    }

    /// First match scanning rows top to bottom, cells left to right.
    pub fn capture(&self, rows: &[Vec<CellValue>]) -> Option<(CellValue, CellValue)> {
        rows.iter().flatten().find_map(|cell| {
            let text = normalize_cell(cell);
            let captures = self.regex.captures(&text)?;
            let group = |index: usize| {
                captures
                    .get(index)
                    .map(|m| m.as_str().trim())
                    .filter(|value| !value.is_empty())
                    .map_or(CellValue::Missing, CellValue::text)
            };
            Some((group(1), group(2)))
        })
    }
}

impl PartialEq for TitlePattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern() == other.pattern()
            && self.code_column == other.code_column
            && self.name_column == other.name_column
    }
}

/// Column values for every pattern; unmatched patterns yield `Missing`.
pub fn capture_titles(
    rows: &[Vec<CellValue>],
    patterns: &[TitlePattern],
) -> Vec<(String, CellValue)> {
    let mut values = Vec::with_capacity(patterns.len() * 2);
    for pattern in patterns {
        let (code, name) = match pattern.capture(rows) {
            Some(found) => found,
            None => {
                debug!(pattern = pattern.pattern(), "title pattern did not match");
                (CellValue::Missing, CellValue::Missing)
            }
        };
        values.push((pattern.code_column.clone(), code));
        values.push((pattern.name_column.clone(), name));
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn province() -> TitlePattern {
        TitlePattern::new(r"จังหวัด\s*(\d+)\s+(.+)", "province_code", "province_name")
            .expect("valid pattern")
    }

    #[test]
    fn captures_code_and_name_from_the_first_matching_cell() {
        let rows = vec![
            vec![CellValue::text("คำของบประมาณ"), CellValue::Missing],
            vec![CellValue::Missing, CellValue::text("  จังหวัด 10  กรุงเทพมหานคร ")],
            vec![CellValue::text("จังหวัด 20 ชลบุรี")],
        ];
        assert_eq!(
            province().capture(&rows),
            Some((CellValue::text("10"), CellValue::text("กรุงเทพมหานคร")))
        );
    }

    #[test]
    fn unmatched_patterns_fill_missing() {
        let values = capture_titles(&[vec![CellValue::text("สรุป")]], &[province()]);
        assert_eq!(
            values,
            [
                ("province_code".to_string(), CellValue::Missing),
                ("province_name".to_string(), CellValue::Missing),
            ]
        );
    }

    #[test]
    fn patterns_need_two_groups() {
        assert!(TitlePattern::new(r"จังหวัด\s*(\d+)", "a", "b").is_err());
        assert!(TitlePattern::new(r"(", "a", "b").is_err());
    }
}
