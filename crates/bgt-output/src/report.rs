//! Quality log, batch summary and JSON run report.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bgt_model::{FileOutcome, QualityLogEntry, QualityReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OutputError, Result};
use crate::writer::{create_with_bom, csv_error};

pub const QUALITY_LOG_HEADER: [&str; 5] = ["source_file", "row", "column", "rule", "value"];

pub const BATCH_SUMMARY_HEADER: [&str; 8] = [
    "file",
    "sheet",
    "rows",
    "exported",
    "reason",
    "unknown_headers",
    "issues_count",
    "log_file",
];

fn finish<W: Write>(path: &Path, writer: &mut csv::Writer<W>) -> Result<()> {
    writer.flush().map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders quality log entries as CSV text (no byte order mark).
pub fn quality_log_csv(entries: &[QualityLogEntry]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_quality_rows(Path::new("quality_log.csv"), &mut writer, entries)?;
    let bytes = writer
        .into_inner()
        .map_err(|err| OutputError::Io {
            path: PathBuf::from("quality_log.csv"),
            source: err.into_error(),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_quality_rows<W: Write>(
    path: &Path,
    writer: &mut csv::Writer<W>,
    entries: &[QualityLogEntry],
) -> Result<()> {
    writer
        .write_record(QUALITY_LOG_HEADER)
        .map_err(csv_error(path))?;
    for entry in entries {
        writer
            .write_record([
                entry.source_file.as_str(),
                entry.row.to_string().as_str(),
                entry.column.as_str(),
                entry.rule.as_str(),
                entry.value.as_str(),
            ])
            .map_err(csv_error(path))?;
    }
    finish(path, writer)
}

/// Writes the quality log; the header is written even when there are no
/// entries.
pub fn write_quality_log(path: &Path, entries: &[QualityLogEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(create_with_bom(path)?);
    write_quality_rows(path, &mut writer, entries)?;
    debug!(path = %path.display(), entries = entries.len(), "wrote quality log");
    Ok(())
}

/// Writes one line per input file.
pub fn write_batch_summary(path: &Path, outcomes: &[FileOutcome], log_file: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_writer(create_with_bom(path)?);
    writer
        .write_record(BATCH_SUMMARY_HEADER)
        .map_err(csv_error(path))?;
    let log_file = log_file.display().to_string();
    for outcome in outcomes {
        let mut unknown = outcome.unknown_headers.clone();
        unknown.sort();
        let reason = match (&outcome.reason, outcome.exported) {
            (Some(reason), _) => reason.clone(),
            (None, true) => "OK".to_string(),
            (None, false) => String::new(),
        };
        writer
            .write_record([
                outcome.file.as_str(),
                outcome.sheet.as_deref().unwrap_or_default(),
                outcome.rows.to_string().as_str(),
                outcome.exported.to_string().as_str(),
                reason.as_str(),
                unknown.join("|").as_str(),
                outcome.issues_count.to_string().as_str(),
                log_file.as_str(),
            ])
            .map_err(csv_error(path))?;
    }
    finish(path, &mut writer)?;
    debug!(path = %path.display(), files = outcomes.len(), "wrote batch summary");
    Ok(())
}

/// Machine-readable summary of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub strict: bool,
    pub files_ingested: usize,
    pub files_skipped: usize,
    pub master_rows: usize,
    pub issue_rows: usize,
    pub quality_log_entries: usize,
    pub missing_core_columns: Vec<String>,
    /// Absent when no data was ingested.
    pub quality: Option<QualityReport>,
    pub master_written: bool,
    pub outputs: Vec<PathBuf>,
    pub files: Vec<FileOutcome>,
}

impl RunReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn write_run_report(path: &Path, report: &RunReport) -> Result<()> {
    let json_error = |source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report).map_err(json_error)?;
    writer.flush().map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "wrote run report");
    Ok(())
}
