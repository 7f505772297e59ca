//! Header-row detection and table extraction from a raw grid.

use bgt_common::normalize_text;
use bgt_model::{CellValue, Row, SOURCE_FILE_COLUMN, SOURCE_ROW_COLUMN, Table, normalize_cell};
use tracing::debug;

use crate::error::ExtractError;
use crate::grid::RawGrid;
use crate::title::{TitlePattern, capture_titles};

pub const DEFAULT_MAX_SCAN_ROWS: usize = 120;
pub const DEFAULT_HINT_BONUS: usize = 5;

/// Keywords that typically appear in a budget export's header row.
pub fn default_hints() -> Vec<String> {
    ["รหัส", "รายการ", "งบ", "ปี", "หน่วยงาน", "กิจกรรม"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub hints: Vec<String>,
    pub hint_bonus: usize,
    pub max_scan_rows: usize,
    /// Number of grid rows forming the header (1 or 2).
    pub header_span: usize,
    /// Pins the header row (0-based) instead of scanning.
    pub header_row: Option<usize>,
    /// Patterns matched against the rows above the header.
    pub title_patterns: Vec<TitlePattern>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            hints: default_hints(),
            hint_bonus: DEFAULT_HINT_BONUS,
            max_scan_rows: DEFAULT_MAX_SCAN_ROWS,
            header_span: 1,
            header_row: None,
            title_patterns: Vec::new(),
        }
    }
}

/// Headers plus rectangular data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    /// 0-based grid row of the (first) header row.
    pub header_row: usize,
    /// Normalized header text, one per kept column.
    pub headers: Vec<String>,
    /// Data rows, each exactly `headers.len()` wide.
    pub rows: Vec<Vec<CellValue>>,
    /// 1-based position of each kept row among the data rows below the header.
    pub source_rows: Vec<usize>,
    /// Values captured from the title rows, copied onto every row.
    pub titles: Vec<(String, CellValue)>,
}

impl ExtractedTable {
    /// Converts to a keyed table using the resolved column `names`
    /// (positionally aligned with `headers`), tagging each row with its
    /// source file and row plus any captured title values.
    pub fn into_table(self, names: &[String], source_file: &str) -> Table {
        let mut columns: Vec<String> = names.to_vec();
        for (column, _) in &self.titles {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        columns.push(SOURCE_FILE_COLUMN.to_string());
        columns.push(SOURCE_ROW_COLUMN.to_string());
        let mut table = Table::new(columns);
        for (cells, source_row) in self.rows.into_iter().zip(self.source_rows) {
            let mut row: Row = names.iter().cloned().zip(cells).collect();
            for (column, value) in &self.titles {
                row.set(column.clone(), value.clone());
            }
            row.set(SOURCE_FILE_COLUMN, CellValue::text(source_file));
            row.set(SOURCE_ROW_COLUMN, CellValue::Number(source_row as f64));
            table.push_row(row);
        }
        table
    }
}

/// Scores a row: non-empty cell count plus the bonus when any hint appears.
fn score_row(row: &[CellValue], hints: &[String], hint_bonus: usize) -> usize {
    let texts: Vec<String> = row
        .iter()
        .map(normalize_cell)
        .filter(|text| !text.is_empty())
        .collect();
    let joined = texts.join(" ");
    let has_hint = hints.iter().any(|hint| {
        let hint = normalize_text(hint);
        !hint.is_empty() && joined.contains(&hint)
    });
    texts.len() + if has_hint { hint_bonus } else { 0 }
}

/// Finds the most header-like row among the first `max_scan_rows` rows.
///
/// Ties go to the earliest row. An empty grid yields row 0.
pub fn detect_header_row(
    grid: &RawGrid,
    hints: &[String],
    hint_bonus: usize,
    max_scan_rows: usize,
) -> usize {
    let mut best_row = 0;
    let mut best_score = 0;
    for (index, row) in grid.rows.iter().take(max_scan_rows).enumerate() {
        let score = score_row(row, hints, hint_bonus);
        if score > best_score {
            best_score = score;
            best_row = index;
        }
    }
    best_row
}

fn cell_at(row: Option<&Vec<CellValue>>, col: usize) -> String {
    row.and_then(|cells| cells.get(col))
        .map(normalize_cell)
        .unwrap_or_default()
}

/// Builds header names from `span` consecutive rows starting at `start`.
///
/// Each column joins its non-empty parts with a space. Columns without any
/// header text are named `column_<n>` (1-based).
fn merge_header_rows(grid: &RawGrid, start: usize, span: usize) -> Vec<String> {
    let header_rows: Vec<Option<&Vec<CellValue>>> =
        (start..start + span).map(|i| grid.rows.get(i)).collect();
    let width = header_rows
        .iter()
        .map(|row| row.map_or(0, Vec::len))
        .max()
        .unwrap_or(0);

    (0..width)
        .map(|col| {
            let parts: Vec<String> = header_rows
                .iter()
                .map(|row| cell_at(*row, col))
                .filter(|part| !part.is_empty())
                .collect();
            let merged = normalize_text(&parts.join(" "));
            if merged.is_empty() {
                format!("column_{}", col + 1)
            } else {
                merged
            }
        })
        .collect()
}

/// Extracts a rectangular table from a raw grid.
///
/// Rows below the header are padded or truncated to the header width, then
/// columns empty in every data row and rows empty in every column are dropped.
pub fn extract(grid: &RawGrid, options: &ExtractOptions) -> Result<ExtractedTable, ExtractError> {
    if grid.is_empty() {
        return Err(ExtractError::EmptyGrid);
    }
    let header_row = match options.header_row {
        Some(row) if row >= grid.len() => {
            return Err(ExtractError::HeaderRowOutOfRange {
                row,
                rows: grid.len(),
            });
        }
        Some(row) => row,
        None => detect_header_row(
            grid,
            &options.hints,
            options.hint_bonus,
            options.max_scan_rows,
        ),
    };
    let titles = capture_titles(
        &grid.rows[..header_row.min(grid.len())],
        &options.title_patterns,
    );
    let span = options.header_span.max(1);
    let mut headers = merge_header_rows(grid, header_row, span);

    let data_start = header_row + span;
    let width = headers.len();
    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    let mut source_rows = Vec::new();
    for (offset, raw) in grid.rows.iter().skip(data_start).enumerate() {
        let mut row: Vec<CellValue> = raw.iter().take(width).cloned().collect();
        row.resize(width, CellValue::Missing);
        rows.push(row);
        source_rows.push(offset + 1);
    }

    if !rows.is_empty() {
        let keep: Vec<bool> = (0..width)
            .map(|col| rows.iter().any(|row| !row[col].is_blank()))
            .collect();
        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped > 0 {
            debug!(dropped, "dropping empty columns");
            headers = retain_columns(headers, &keep);
            rows = rows
                .into_iter()
                .map(|row| retain_columns(row, &keep))
                .collect();
        }
    }

    let (rows, source_rows): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .zip(source_rows)
        .filter(|(row, _)| row.iter().any(|cell| !cell.is_blank()))
        .unzip();

    debug!(
        header_row,
        columns = headers.len(),
        rows = rows.len(),
        "extracted table"
    );
    Ok(ExtractedTable {
        header_row,
        headers,
        rows,
        source_rows,
        titles,
    })
}

fn retain_columns<T>(values: Vec<T>, keep: &[bool]) -> Vec<T> {
    values
        .into_iter()
        .zip(keep)
        .filter_map(|(value, keep)| keep.then_some(value))
        .collect()
}
