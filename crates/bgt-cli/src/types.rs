use std::path::PathBuf;

use bgt_model::{FileOutcome, QualityReport};
use bgt_output::OutputFormat;

/// What to consolidate and where to put it.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub inputs: Vec<PathBuf>,
    pub configs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub strict: bool,
    pub format: OutputFormat,
    pub dry_run: bool,
}

/// How a batch ended, mapped onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Success,
    NoData,
    GateFailed,
}

impl BatchStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::NoData => 2,
            Self::GateFailed => 3,
        }
    }
}

#[derive(Debug)]
pub struct BatchResult {
    pub output_dir: PathBuf,
    pub files: Vec<FileOutcome>,
    pub quality: Option<QualityReport>,
    pub master_rows: usize,
    pub issue_rows: usize,
    pub quality_log_entries: usize,
    pub missing_core_columns: Vec<String>,
    pub master_written: bool,
    /// Every file written, in write order. Empty on a dry run.
    pub outputs: Vec<PathBuf>,
    pub dry_run: bool,
    pub status: BatchStatus,
}

impl BatchResult {
    pub fn exported_files(&self) -> usize {
        self.files.iter().filter(|file| file.exported).count()
    }
}
