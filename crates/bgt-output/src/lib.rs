#![deny(unsafe_code)]

//! Consolidation outputs: the master and issues tables, the quality log, the
//! batch summary and the JSON run report.

pub mod assemble;
pub mod error;
pub mod report;
pub mod writer;

use std::fs;
use std::path::Path;

pub use assemble::{
    Assembled, assemble, is_issue, master_column_order, missing_core_columns, union_tables,
    warn_missing_core,
};
pub use error::{OutputError, Result};
pub use report::{
    BATCH_SUMMARY_HEADER, QUALITY_LOG_HEADER, RunReport, quality_log_csv, write_batch_summary,
    write_quality_log, write_run_report,
};
pub use writer::{OutputFormat, UTF8_BOM, write_table, write_table_csv, write_table_xlsx};

pub const MASTER_STEM: &str = "MasterData";
pub const MASTER_SHEET: &str = "MasterData";
pub const ISSUES_STEM: &str = "DataIssues";
pub const ISSUES_SHEET: &str = "Issues";
pub const QUALITY_LOG_FILE: &str = "quality_log.csv";
pub const BATCH_SUMMARY_FILE: &str = "batch_summary.csv";
pub const RUN_REPORT_FILE: &str = "run_report.json";

/// Creates the output directory (and parents) if needed.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}
