use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use bgt_cli::{BatchResult, BatchStatus};
use bgt_model::{FileOutcome, QualityReport};

pub fn print_summary(result: &BatchResult) {
    println!("Output: {}", result.output_dir.display());
    if result.dry_run {
        println!("Dry run: no files written");
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Sheet"),
        header_cell("Rows"),
        header_cell("Issues"),
        header_cell("Exported"),
        header_cell("Unknown headers"),
        header_cell("Reason"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    let mut total_rows = 0usize;
    let mut total_issues = 0usize;
    for file in &result.files {
        total_rows += file.rows;
        total_issues += file.issues_count;
        table.add_row(file_row(file));
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        count_cell(total_issues, Color::Yellow).add_attribute(Attribute::Bold),
        Cell::new(format!("{}/{}", result.exported_files(), result.files.len()))
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");

    if let Some(report) = &result.quality {
        print_gate_table(report, result);
    }
    if !result.missing_core_columns.is_empty() {
        eprintln!(
            "Missing core columns: {}",
            result.missing_core_columns.join(", ")
        );
    }
    match result.status {
        BatchStatus::Success => {}
        BatchStatus::NoData => eprintln!("No data ingested."),
        BatchStatus::GateFailed => {
            eprintln!("Quality gate failed:");
            if let Some(report) = &result.quality {
                for message in &report.messages {
                    eprintln!("- {message}");
                }
            }
        }
    }
}

fn file_row(file: &FileOutcome) -> Vec<Cell> {
    let exported = if file.exported {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("✗").fg(Color::Red).add_attribute(Attribute::Bold)
    };
    let unknown = if file.unknown_headers.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(file.unknown_headers.join(", ")).fg(Color::Yellow)
    };
    vec![
        Cell::new(&file.file).fg(Color::Blue),
        file.sheet.as_deref().map_or_else(|| dim_cell("-"), Cell::new),
        Cell::new(file.rows),
        count_cell(file.issues_count, Color::Yellow),
        exported,
        unknown,
        file.reason
            .as_deref()
            .map_or_else(|| dim_cell("-"), |reason| Cell::new(reason).fg(Color::Red)),
    ]
}

fn print_gate_table(report: &QualityReport, result: &BatchResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Check"),
        header_cell("Value"),
        header_cell("Limit"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    let thresholds = report.thresholds;
    table.add_row(vec![
        Cell::new("Unknown category ratio"),
        Cell::new(format!("{:.4}", report.unknown_ratio)),
        Cell::new(format!("≤ {:.4}", thresholds.unknown_max)),
        status_cell(report.unknown_ratio <= thresholds.unknown_max),
    ]);
    table.add_row(vec![
        Cell::new("Non-null amount ratio"),
        Cell::new(format!("{:.4}", report.nonnull_ratio)),
        Cell::new(format!("≥ {:.4}", thresholds.nonnull_min)),
        status_cell(report.nonnull_ratio >= thresholds.nonnull_min),
    ]);
    table.add_row(vec![
        Cell::new("Negative amounts"),
        Cell::new(report.negative_count),
        Cell::new("0"),
        status_cell(report.negative_count == 0),
    ]);
    table.add_row(vec![
        Cell::new("Master rows"),
        Cell::new(result.master_rows),
        dim_cell("-"),
        if result.master_written {
            Cell::new("written").fg(Color::Green)
        } else {
            dim_cell("not written")
        },
    ]);
    table.add_row(vec![
        Cell::new("Issue rows"),
        Cell::new(result.issue_rows),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!();
    println!("Quality gate:");
    println!("{table}");
}

fn status_cell(passed: bool) -> Cell {
    if passed {
        Cell::new("PASS")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("FAIL")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(165);
    if table.column_count() >= 7 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::UpperBoundary(Width::Fixed(20)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::UpperBoundary(Width::Percentage(25)),
            ColumnConstraint::UpperBoundary(Width::Percentage(25)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
