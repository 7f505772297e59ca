use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use bgt_cli::{BatchOptions, BatchResult, load_pipeline_config, run_batch};
use bgt_output::OutputFormat;

use crate::cli::{FieldsArgs, OutputFormatArg, RunArgs};
use crate::summary::{apply_table_style, dim_cell, header_cell};

pub fn run_consolidate(args: &RunArgs) -> Result<BatchResult> {
    let options = BatchOptions {
        inputs: args.inputs.clone(),
        configs: args.config.clone(),
        output_dir: args.output_dir.clone(),
        strict: args.strict,
        format: output_format(args.format),
        dry_run: args.dry_run,
    };
    run_batch(&options).context("consolidate budget files")
}

pub fn run_fields(args: &FieldsArgs) -> Result<()> {
    let config = load_pipeline_config(&args.config, |name| std::env::var(name).ok())?;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Aliases")]);
    apply_table_style(&mut table);
    for entry in config.synonyms.entries() {
        table.add_row(vec![entry.canonical().to_string(), entry.aliases().join(", ")]);
    }
    println!("{table}");

    if !config.resolve.patterns.is_empty() {
        let mut patterns = Table::new();
        patterns.set_header(vec![header_cell("Pattern"), header_cell("Field")]);
        apply_table_style(&mut patterns);
        for pattern in &config.resolve.patterns {
            patterns.add_row(vec![pattern.pattern(), pattern.canonical()]);
        }
        println!();
        println!("Header patterns:");
        println!("{patterns}");
    }

    let mut rules = Table::new();
    rules.set_header(vec![header_cell("Rule"), header_cell("Sets")]);
    apply_table_style(&mut rules);
    for (index, rule) in config.classifier.rules.iter().enumerate() {
        rules.add_row(vec![
            Cell::new(rule.label(index)),
            Cell::new(rule.assigned_fields().collect::<Vec<_>>().join(", ")),
        ]);
    }
    if config.classifier.rules.is_empty() {
        rules.add_row(vec![dim_cell("-"), dim_cell("-")]);
    }
    println!();
    println!("Classification rules:");
    println!("{rules}");
    Ok(())
}

fn output_format(format: OutputFormatArg) -> OutputFormat {
    match format {
        OutputFormatArg::Xlsx => OutputFormat::Xlsx,
        OutputFormatArg::Csv => OutputFormat::Csv,
        OutputFormatArg::Both => OutputFormat::Both,
    }
}
