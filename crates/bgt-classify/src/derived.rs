//! Derived columns computed after classification.

use bgt_model::{CellValue, DerivedColumn, DerivedOp, Row, Table, normalize_cell};

fn numeric(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(number) => Some(*number),
        CellValue::Text(text) => bgt_common::parse_amount(text),
        CellValue::Missing => None,
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

fn finish(value: Option<f64>, round: Option<u32>) -> CellValue {
    match value {
        Some(v) if v.is_finite() => CellValue::Number(round.map_or(v, |places| round_to(v, places))),
        _ => CellValue::Missing,
    }
}

/// Computes one derived value from a row.
pub fn derive_value(column: &DerivedColumn, row: &Row) -> CellValue {
    match &column.op {
        DerivedOp::Concat { fields, separator } => {
            let parts: Vec<String> = fields.iter().map(|f| normalize_cell(row.get(f))).collect();
            if parts.iter().all(String::is_empty) {
                CellValue::Missing
            } else {
                CellValue::Text(parts.join(separator))
            }
        }
        DerivedOp::Sum { fields } => {
            let values: Vec<f64> = fields.iter().filter_map(|f| numeric(row.get(f))).collect();
            let total = (!values.is_empty()).then(|| values.iter().sum::<f64>());
            finish(total, column.round)
        }
        DerivedOp::Ratio {
            numerator,
            denominator,
        } => {
            let ratio = match (numeric(row.get(numerator)), numeric(row.get(denominator))) {
                (Some(n), Some(d)) if d != 0.0 => Some(n / d),
                _ => None,
            };
            finish(ratio, column.round)
        }
    }
}

/// Evaluates derived columns in order, so later columns may read earlier ones.
pub fn apply_derived(row: &mut Row, columns: &[DerivedColumn]) {
    for column in columns {
        let value = derive_value(column, row);
        row.set(column.name.clone(), value);
    }
}

/// Adds every named column that is absent; existing rows read it as `Missing`.
pub fn ensure_columns<'a, I>(table: &mut Table, names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut added = Vec::new();
    for name in names {
        if table.ensure_column(name) {
            added.push(name.to_string());
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, op: DerivedOp, round: Option<u32>) -> DerivedColumn {
        DerivedColumn {
            name: name.to_string(),
            op,
            round,
        }
    }

    #[test]
    fn concat_joins_normalized_parts() {
        let row = Row::from_iter([
            ("แผนงาน", CellValue::text("แผนงานบุคลากรภาครัฐ ")),
            ("ผลผลิต/โครงการ", CellValue::text("ผลผลิตที่ 1")),
        ]);
        let col = column(
            "ระดับบน",
            DerivedOp::Concat {
                fields: vec!["แผนงาน".to_string(), "ผลผลิต/โครงการ".to_string()],
                separator: ":".to_string(),
            },
            None,
        );
        assert_eq!(
            derive_value(&col, &row),
            CellValue::text("แผนงานบุคลากรภาครัฐ:ผลผลิตที่ 1")
        );
        assert!(derive_value(&col, &Row::new()).is_missing());
    }

    #[test]
    fn sum_skips_missing_operands() {
        let row = Row::from_iter([
            ("ปี2569", CellValue::Number(100.0)),
            ("ปี2570", CellValue::text("1,000")),
        ]);
        let col = column(
            "รวม",
            DerivedOp::Sum {
                fields: vec!["ปี2569".into(), "ปี2570".into(), "ปี2571".into()],
            },
            None,
        );
        assert_eq!(derive_value(&col, &row), CellValue::Number(1100.0));
        assert!(derive_value(&col, &Row::new()).is_missing());
    }

    #[test]
    fn ratio_is_safe_and_rounded() {
        let col = column(
            "สัดส่วน",
            DerivedOp::Ratio {
                numerator: "a".into(),
                denominator: "b".into(),
            },
            Some(2),
        );
        let row = Row::from_iter([("a", CellValue::Number(1.0)), ("b", CellValue::Number(3.0))]);
        assert_eq!(derive_value(&col, &row), CellValue::Number(0.33));
        let zero = Row::from_iter([("a", CellValue::Number(1.0)), ("b", CellValue::Number(0.0))]);
        assert!(derive_value(&col, &zero).is_missing());
    }

    #[test]
    fn later_columns_see_earlier_ones() {
        let mut row = Row::from_iter([("a", CellValue::Number(2.0)), ("b", CellValue::Number(3.0))]);
        apply_derived(
            &mut row,
            &[
                column(
                    "s",
                    DerivedOp::Sum {
                        fields: vec!["a".into(), "b".into()],
                    },
                    None,
                ),
                column(
                    "r",
                    DerivedOp::Ratio {
                        numerator: "a".into(),
                        denominator: "s".into(),
                    },
                    Some(1),
                ),
            ],
        );
        assert_eq!(row.get("r"), &CellValue::Number(0.4));
    }
}
