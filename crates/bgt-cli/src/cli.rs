//! CLI argument definitions for the budget consolidator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "bgt",
    version,
    about = "Consolidate budget request spreadsheets into one master table",
    long_about = "Consolidate budget request spreadsheets into one master table.\n\n\
                  Detects header rows, maps Thai and English headers to canonical fields,\n\
                  classifies rows with configurable rules and gates the result on\n\
                  data-quality thresholds (UNKNOWN_MAX, NONNULL_MIN)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Consolidate input files and folders into the master outputs.
    Run(RunArgs),

    /// List canonical fields and their aliases after configuration.
    Fields(FieldsArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Spreadsheet files or folders to consolidate.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Configuration file; repeat to layer several in order.
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    pub config: Vec<PathBuf>,

    /// Output directory for generated files.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Withhold every file with a row-level quality issue from the master table.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Table output format.
    #[arg(long = "format", value_enum, default_value = "xlsx")]
    pub format: OutputFormatArg,

    /// Process and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct FieldsArgs {
    /// Configuration file; repeat to layer several in order.
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    pub config: Vec<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Xlsx,
    Csv,
    Both,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_layered_configs() {
        let cli = Cli::try_parse_from([
            "bgt", "run", "in", "-c", "base.yaml", "-c", "site.yaml", "--strict", "--format",
            "both",
        ])
        .expect("parse");
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config.len(), 2);
        assert!(args.strict);
        assert!(matches!(args.format, OutputFormatArg::Both));
        assert_eq!(args.output_dir, PathBuf::from("output"));
    }
}
