//! Table writers: xlsx via `rust_xlsxwriter` and UTF-8 (BOM) CSV.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bgt_model::{CellValue, Table};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OutputError, Result};

/// Byte order mark written at the start of CSV files so spreadsheet
/// applications detect UTF-8 Thai text.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Which table formats to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
    Both,
}

impl OutputFormat {
    pub fn writes_xlsx(self) -> bool {
        matches!(self, Self::Xlsx | Self::Both)
    }

    pub fn writes_csv(self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }
}

fn xlsx_error(path: &Path) -> impl FnOnce(XlsxError) -> OutputError + '_ {
    move |source| OutputError::Xlsx {
        path: path.to_path_buf(),
        source,
    }
}

fn cell_index(path: &Path, row: usize, col: usize) -> Result<(u32, u16)> {
    match (u32::try_from(row), u16::try_from(col)) {
        (Ok(row), Ok(col)) => Ok((row, col)),
        _ => Err(xlsx_error(path)(XlsxError::RowColumnLimitError)),
    }
}

/// Writes `table` as a single-sheet workbook with a bold header row.
pub fn write_table_xlsx(path: &Path, sheet: &str, table: &Table) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).map_err(xlsx_error(path))?;

    for (index, column) in table.columns.iter().enumerate() {
        let (row, col) = cell_index(path, 0, index)?;
        worksheet
            .write_string_with_format(row, col, column, &header)
            .map_err(xlsx_error(path))?;
    }

    for (row_index, data) in table.rows.iter().enumerate() {
        for (col_index, column) in table.columns.iter().enumerate() {
            let (row, col) = cell_index(path, row_index + 1, col_index)?;
            match data.get(column) {
                CellValue::Text(text) => {
                    worksheet
                        .write_string(row, col, text)
                        .map_err(xlsx_error(path))?;
                }
                CellValue::Number(number) if number.is_finite() => {
                    worksheet
                        .write_number(row, col, *number)
                        .map_err(xlsx_error(path))?;
                }
                CellValue::Number(_) | CellValue::Missing => {}
            }
        }
    }

    workbook.save(path).map_err(xlsx_error(path))?;
    debug!(path = %path.display(), rows = table.len(), "wrote workbook");
    Ok(())
}

/// Opens `path` for writing and emits the UTF-8 byte order mark.
pub(crate) fn create_with_bom(path: &Path) -> Result<BufWriter<File>> {
    let io_error = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    writer.write_all(UTF8_BOM).map_err(io_error)?;
    Ok(writer)
}

pub(crate) fn csv_error(path: &Path) -> impl Fn(csv::Error) -> OutputError + '_ {
    move |source| OutputError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes `table` as CSV; numbers without trailing zeros, missing as empty.
pub fn write_table_csv(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_writer(create_with_bom(path)?);
    writer
        .write_record(&table.columns)
        .map_err(csv_error(path))?;
    for row in &table.rows {
        let record: Vec<String> = table
            .columns
            .iter()
            .map(|column| row.get(column).to_string())
            .collect();
        writer.write_record(&record).map_err(csv_error(path))?;
    }
    writer.flush().map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), rows = table.len(), "wrote CSV");
    Ok(())
}

/// Writes `table` as `<dir>/<stem>.xlsx` and/or `<dir>/<stem>.csv`.
pub fn write_table(
    dir: &Path,
    stem: &str,
    sheet: &str,
    table: &Table,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if format.writes_xlsx() {
        let path = dir.join(format!("{stem}.xlsx"));
        write_table_xlsx(&path, sheet, table)?;
        written.push(path);
    }
    if format.writes_csv() {
        let path = dir.join(format!("{stem}.csv"));
        write_table_csv(&path, table)?;
        written.push(path);
    }
    Ok(written)
}
