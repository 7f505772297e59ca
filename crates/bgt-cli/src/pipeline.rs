//! Batch pipeline: configuration, per-file ingestion, gating and outputs.
//!
//! Per-file failures are recorded and the batch continues; only
//! configuration and output errors abort the run.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use bgt_classify::{ClassificationSummary, classify_table};
use bgt_config::{PipelineConfig, apply_env_overrides, load_config};
use bgt_ingest::{coerce_numeric_columns, discover_inputs, extract, read_grid, read_reference_rows};
use bgt_map::{resolve_detailed, unknown_headers};
use bgt_model::{FileOutcome, QualityLogEntry, Table};
use bgt_output::{
    Assembled, BATCH_SUMMARY_FILE, ISSUES_SHEET, ISSUES_STEM, MASTER_SHEET, MASTER_STEM,
    QUALITY_LOG_FILE, RUN_REPORT_FILE, RunReport, assemble, ensure_output_dir,
    warn_missing_core, write_batch_summary, write_quality_log, write_run_report, write_table,
};
use bgt_validate::{check_quality, gate_strict_files, validate_rows};
use chrono::Utc;
use tracing::{debug, error, info, info_span, warn};

use crate::types::{BatchOptions, BatchResult, BatchStatus};

/// One input file after ingestion, mapping, validation and classification.
#[derive(Debug)]
pub struct ProcessedFile {
    pub file_name: String,
    pub sheet: String,
    pub table: Table,
    pub unknown_headers: Vec<String>,
    pub quality_log: Vec<QualityLogEntry>,
    pub classification: ClassificationSummary,
}

impl ProcessedFile {
    pub fn outcome(&self) -> FileOutcome {
        FileOutcome {
            file: self.file_name.clone(),
            exported: true,
            reason: None,
            unknown_headers: self.unknown_headers.clone(),
            issues_count: self.quality_log.len(),
            rows: self.table.len(),
            sheet: Some(self.sheet.clone()),
        }
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Loads the layered configuration, applies threshold overrides from
/// `lookup` and merges the data dictionary when one is configured.
pub fn load_pipeline_config<F>(configs: &[PathBuf], lookup: F) -> Result<PipelineConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = load_config(configs).context("load configuration")?;
    apply_env_overrides(&mut config.quality.thresholds, lookup)
        .context("apply quality threshold overrides")?;
    merge_datadict(&mut config);
    Ok(config)
}

/// A missing or unreadable data dictionary only costs its aliases.
fn merge_datadict(config: &mut PipelineConfig) {
    let Some(source) = config.datadict.clone() else {
        return;
    };
    if !source.path.is_file() {
        warn!(path = %source.path.display(), "data dictionary not found, continuing without it");
        return;
    }
    match read_reference_rows(&source.path, source.sheet.as_deref()) {
        Ok(rows) => {
            let merged = config.merge_reference(&rows);
            info!(
                path = %source.path.display(),
                rows = merged,
                canonical_fields = config.synonyms.len(),
                "merged data dictionary"
            );
        }
        Err(error) => {
            warn!(path = %source.path.display(), %error, "failed to read data dictionary, continuing without it");
        }
    }
}

/// Reads one input file and runs it through mapping, row validation and
/// classification.
pub fn process_file(path: &Path, config: &PipelineConfig) -> Result<ProcessedFile> {
    let name = file_name(path);
    let loaded = read_grid(path, config.sheet_override_for(&name), &config.preferred_sheets)
        .with_context(|| format!("read {}", path.display()))?;
    let options = config.extract_options_for(&name);
    let extracted = extract(&loaded.grid, &options)
        .with_context(|| format!("extract table from sheet '{}'", loaded.sheet))?;
    debug!(
        sheet = %loaded.sheet,
        header_row = extracted.header_row,
        columns = extracted.headers.len(),
        rows = extracted.rows.len(),
        "extracted table"
    );

    let resolved = resolve_detailed(&extracted.headers, &config.synonyms, &config.resolve);
    let unknown = unknown_headers(&resolved);
    if !unknown.is_empty() {
        debug!(columns = ?unknown, "unmapped headers passed through");
    }
    let names: Vec<String> = resolved.into_iter().map(|header| header.name).collect();
    let mut table = extracted.into_table(&names, &name);

    let converted = coerce_numeric_columns(&mut table, &config.coercion);
    if !converted.is_empty() {
        debug!(columns = ?converted, "converted numeric columns");
    }
    let quality_log = validate_rows(&table, &config.validation, &name);
    let classification = classify_table(&mut table, &config.classifier);

    Ok(ProcessedFile {
        file_name: name,
        sheet: loaded.sheet,
        table,
        unknown_headers: unknown,
        quality_log,
        classification,
    })
}

/// Runs a batch, reading threshold overrides from the process environment.
pub fn run_batch(options: &BatchOptions) -> Result<BatchResult> {
    run_batch_with_env(options, |name| std::env::var(name).ok())
}

/// Runs a batch with threshold overrides looked up through `lookup`.
pub fn run_batch_with_env<F>(options: &BatchOptions, lookup: F) -> Result<BatchResult>
where
    F: Fn(&str) -> Option<String>,
{
    let batch_span = info_span!("batch", output_dir = %options.output_dir.display());
    let _batch_guard = batch_span.enter();
    let start = Instant::now();

    let config = load_pipeline_config(&options.configs, lookup)?;
    let inputs =
        discover_inputs(&options.inputs, &config.ignore_files).context("discover input files")?;
    info!(files = inputs.len(), strict = options.strict, "starting batch");

    let mut processed = Vec::new();
    let mut outcomes = Vec::new();
    for path in &inputs {
        let name = file_name(path);
        let file_span = info_span!("file", file = %name);
        let file_start = Instant::now();
        match file_span.in_scope(|| process_file(path, &config)) {
            Ok(file) => {
                info!(
                    file = %name,
                    sheet = %file.sheet,
                    rows = file.table.len(),
                    issues = file.quality_log.len(),
                    unmatched = file.classification.unmatched_rows,
                    duration_ms = file_start.elapsed().as_millis(),
                    "file processed"
                );
                outcomes.push(file.outcome());
                processed.push(file);
            }
            Err(error) => {
                warn!(file = %name, error = %format!("{error:#}"), "skipping file");
                outcomes.push(FileOutcome::skipped(name, format!("ERROR: {error:#}")));
            }
        }
    }

    let quality_log: Vec<QualityLogEntry> = processed
        .iter()
        .flat_map(|file| file.quality_log.iter().cloned())
        .collect();
    let decision = gate_strict_files(options.strict, &quality_log);
    let mut tables = Vec::new();
    for (file, outcome) in processed.into_iter().zip(outcomes.iter_mut().filter(|o| o.exported)) {
        if decision.is_blocked(&file.file_name) {
            warn!(file = %file.file_name, issues = file.quality_log.len(), "strict mode: file withheld");
            outcome.exported = false;
            outcome.reason = Some(format!(
                "STRICT mode: {} quality issue(s)",
                file.quality_log.len()
            ));
        } else {
            tables.push(file.table);
        }
    }

    let mut result = BatchResult {
        output_dir: options.output_dir.clone(),
        files: outcomes,
        quality: None,
        master_rows: 0,
        issue_rows: 0,
        quality_log_entries: quality_log.len(),
        missing_core_columns: Vec::new(),
        master_written: false,
        outputs: Vec::new(),
        dry_run: options.dry_run,
        status: BatchStatus::NoData,
    };

    let assembled = if tables.is_empty() {
        warn!("no data ingested");
        None
    } else {
        let assembled = assemble(tables, &config.output.columns, &config.quality);
        result.missing_core_columns =
            warn_missing_core(&assembled.master, &config.output.expected_core);
        let report = check_quality(&assembled.master, &config.quality);
        if !report.passed {
            for message in &report.messages {
                error!(message = %message, "quality gate failed");
            }
        }
        result.master_rows = assembled.master.len();
        result.issue_rows = assembled.issues.len();
        result.status = if report.passed {
            BatchStatus::Success
        } else {
            BatchStatus::GateFailed
        };
        result.quality = Some(report);
        Some(assembled)
    };

    if options.dry_run {
        info!("dry run: no files written");
    } else {
        write_outputs(options, assembled.as_ref(), &quality_log, &mut result)?;
    }

    info!(
        files = result.files.len(),
        exported = result.exported_files(),
        master_rows = result.master_rows,
        issue_rows = result.issue_rows,
        status = ?result.status,
        duration_ms = start.elapsed().as_millis(),
        "batch complete"
    );
    Ok(result)
}

fn write_outputs(
    options: &BatchOptions,
    assembled: Option<&Assembled>,
    quality_log: &[QualityLogEntry],
    result: &mut BatchResult,
) -> Result<()> {
    let dir = &options.output_dir;
    ensure_output_dir(dir)?;

    if let Some(assembled) = assembled {
        let written = write_table(dir, ISSUES_STEM, ISSUES_SHEET, &assembled.issues, options.format)
            .context("write issues table")?;
        result.outputs.extend(written);
        if result.status == BatchStatus::Success {
            let written =
                write_table(dir, MASTER_STEM, MASTER_SHEET, &assembled.master, options.format)
                    .context("write master table")?;
            result.outputs.extend(written);
            result.master_written = true;
        }
    }

    let log_path = dir.join(QUALITY_LOG_FILE);
    write_quality_log(&log_path, quality_log).context("write quality log")?;
    result.outputs.push(log_path.clone());

    let summary_path = dir.join(BATCH_SUMMARY_FILE);
    write_batch_summary(&summary_path, &result.files, &log_path)
        .context("write batch summary")?;
    result.outputs.push(summary_path);

    let report_path = dir.join(RUN_REPORT_FILE);
    result.outputs.push(report_path.clone());
    let report = run_report(options, result);
    write_run_report(&report_path, &report).context("write run report")?;

    info!(outputs = result.outputs.len(), master_written = result.master_written, "outputs written");
    Ok(())
}

fn run_report(options: &BatchOptions, result: &BatchResult) -> RunReport {
    let files_ingested = result.files.iter().filter(|file| file.sheet.is_some()).count();
    RunReport {
        generated_at: Utc::now(),
        strict: options.strict,
        files_ingested,
        files_skipped: result.files.len() - files_ingested,
        master_rows: result.master_rows,
        issue_rows: result.issue_rows,
        quality_log_entries: result.quality_log_entries,
        missing_core_columns: result.missing_core_columns.clone(),
        quality: result.quality.clone(),
        master_written: result.master_written,
        outputs: result.outputs.clone(),
        files: result.files.clone(),
    }
}
