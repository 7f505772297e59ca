//! Union of per-file tables, master column order and the issues split.

use bgt_model::{CellValue, Table};
use bgt_validate::QualityGateSettings;
use tracing::{debug, warn};

/// Concatenates tables; the column list is the union in first-seen order.
pub fn union_tables<I>(tables: I) -> Table
where
    I: IntoIterator<Item = Table>,
{
    let mut merged = Table::default();
    for table in tables {
        for column in &table.columns {
            merged.ensure_column(column);
        }
        merged.rows.extend(table.rows);
    }
    merged
}

/// Master schema columns first (including ones no file supplied), then every
/// other column in its existing order.
pub fn master_column_order(columns: &[String], master: &[String]) -> Vec<String> {
    let mut ordered: Vec<String> = Vec::with_capacity(columns.len() + master.len());
    for column in master.iter().chain(columns) {
        if !ordered.contains(column) {
            ordered.push(column.clone());
        }
    }
    ordered
}

/// True when the row belongs in the issues table: unknown category or no
/// usable amount.
pub fn is_issue(row: &bgt_model::Row, settings: &QualityGateSettings) -> bool {
    let amount_missing = !matches!(
        row.get(&settings.amount_field),
        CellValue::Number(value) if value.is_finite()
    );
    amount_missing || settings.is_unknown(row.get(&settings.category_field))
}

/// Master-schema columns the merged table lacks.
pub fn missing_core_columns(table: &Table, expected: &[String]) -> Vec<String> {
    expected
        .iter()
        .filter(|column| !table.has_column(column))
        .cloned()
        .collect()
}

/// The consolidated master table and the rows needing attention.
#[derive(Debug, Clone, Default)]
pub struct Assembled {
    pub master: Table,
    pub issues: Table,
}

/// Unions `tables`, orders columns by `master_columns` and extracts issues.
pub fn assemble<I>(tables: I, master_columns: &[String], settings: &QualityGateSettings) -> Assembled
where
    I: IntoIterator<Item = Table>,
{
    let mut master = union_tables(tables);
    master.columns = master_column_order(&master.columns, master_columns);

    let issues = Table {
        columns: master.columns.clone(),
        rows: master
            .rows
            .iter()
            .filter(|row| is_issue(row, settings))
            .cloned()
            .collect(),
    };
    debug!(
        rows = master.len(),
        columns = master.columns.len(),
        issues = issues.len(),
        "assembled master table"
    );
    Assembled { master, issues }
}

/// Logs a warning for each expected core column the master table lacks.
pub fn warn_missing_core(table: &Table, expected: &[String]) -> Vec<String> {
    let missing = missing_core_columns(table, expected);
    if !missing.is_empty() {
        warn!(columns = ?missing, "expected core columns are missing");
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgt_model::Row;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn master_order_puts_schema_first() {
        let ordered = master_column_order(&names(&["x", "b", "a"]), &names(&["a", "b", "c"]));
        assert_eq!(ordered, ["a", "b", "c", "x"]);
    }

    #[test]
    fn issues_cover_unknown_and_missing_amounts() {
        let settings = QualityGateSettings::default();
        let ok = Row::from_iter([
            ("p_total_bud", CellValue::Number(1.0)),
            ("budget_group", CellValue::text("งบลงทุน")),
        ]);
        let unknown = Row::from_iter([
            ("p_total_bud", CellValue::Number(1.0)),
            ("budget_group", CellValue::text("ไม่ทราบหมวด")),
        ]);
        let no_amount = Row::from_iter([("budget_group", CellValue::text("งบลงทุน"))]);
        assert!(!is_issue(&ok, &settings));
        assert!(is_issue(&unknown, &settings));
        assert!(is_issue(&no_amount, &settings));
    }
}
