//! Raw grid reading from workbooks and CSV files.

use std::path::Path;

use bgt_common::normalize_text;
use bgt_model::CellValue;
use calamine::{Data, Range, Reader, open_workbook_auto};
use csv::ReaderBuilder;
use tracing::debug;

use crate::discovery::InputKind;
use crate::error::{IngestError, Result};

/// Sheet name reported for CSV inputs.
pub const CSV_SHEET_NAME: &str = "csv";

/// Rows of cells exactly as read; row widths may differ.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    pub rows: Vec<Vec<CellValue>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Builds a grid from text cells; empty strings become `Missing`.
    pub fn from_text<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|cell| text_cell(cell.as_ref())).collect())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// A grid plus the sheet it came from.
#[derive(Debug, Clone)]
pub struct LoadedSheet {
    pub sheet: String,
    pub grid: RawGrid,
}

fn text_cell(raw: &str) -> CellValue {
    if raw.is_empty() {
        CellValue::Missing
    } else {
        CellValue::Text(raw.to_string())
    }
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) if f.is_finite() => CellValue::Number(*f),
        Data::Float(_) => CellValue::Missing,
        Data::String(s) => text_cell(s),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => CellValue::Text(dt.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => text_cell(s),
        Data::Error(_) | Data::Empty => CellValue::Missing,
    }
}

/// Converts a calamine range to a grid anchored at A1.
///
/// Ranges start at their first used cell, so leading empty rows and columns
/// are restored to keep row numbers aligned with the sheet.
fn range_to_grid(range: &Range<Data>) -> RawGrid {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![CellValue::Missing; col_offset];
        cells.extend(row.iter().map(data_to_cell));
        rows.push(cells);
    }
    RawGrid::new(rows)
}

/// Chooses the sheet to read.
///
/// An explicit override wins; otherwise the first sheet whose normalized name
/// contains a preferred keyword (keywords tried in order); otherwise the
/// first sheet.
pub fn select_sheet(
    sheet_names: &[String],
    override_sheet: Option<&str>,
    preferred: &[String],
) -> Option<String> {
    if let Some(sheet) = override_sheet {
        return Some(sheet.to_string());
    }
    for keyword in preferred {
        let keyword = normalize_text(keyword);
        if keyword.is_empty() {
            continue;
        }
        if let Some(name) = sheet_names
            .iter()
            .find(|name| normalize_text(name).contains(&keyword))
        {
            return Some(name.clone());
        }
    }
    sheet_names.first().cloned()
}

/// Reads one sheet of a workbook or the whole of a CSV file.
pub fn read_grid(
    path: &Path,
    override_sheet: Option<&str>,
    preferred_sheets: &[String],
) -> Result<LoadedSheet> {
    match InputKind::from_path(path) {
        Some(InputKind::Csv) => Ok(LoadedSheet {
            sheet: CSV_SHEET_NAME.to_string(),
            grid: read_csv_grid(path)?,
        }),
        Some(InputKind::Workbook) => read_workbook_grid(path, override_sheet, preferred_sheets),
        None => Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

fn read_workbook_grid(
    path: &Path,
    override_sheet: Option<&str>,
    preferred_sheets: &[String],
) -> Result<LoadedSheet> {
    let mut workbook = open_workbook_auto(path).map_err(|source| IngestError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet = select_sheet(&sheet_names, override_sheet, preferred_sheets).ok_or_else(|| {
        IngestError::NoSheets {
            path: path.to_path_buf(),
        }
    })?;
    if !sheet_names.contains(&sheet) {
        return Err(IngestError::SheetNotFound {
            path: path.to_path_buf(),
            sheet,
        });
    }
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|source| IngestError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;
    let grid = range_to_grid(&range);
    debug!(
        path = %path.display(),
        sheet = %sheet,
        rows = grid.len(),
        "read worksheet"
    );
    Ok(LoadedSheet { sheet, grid })
}

/// Reads a CSV file without header interpretation; every field is text.
pub fn read_csv_grid(path: &Path) -> Result<RawGrid> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(record.iter().map(text_cell).collect());
    }
    Ok(RawGrid::new(rows))
}

/// Reads a reference table (data dictionary) as rows of normalized text.
///
/// The first row is a title row and is skipped.
pub fn read_reference_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<String>>> {
    let loaded = read_grid(path, sheet, &[])?;
    Ok(loaded
        .grid
        .rows
        .iter()
        .skip(1)
        .map(|row| row.iter().map(bgt_model::normalize_cell).collect())
        .collect())
}
