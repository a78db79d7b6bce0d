//! Terminal and JSON rendering of report summaries.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use cdr_report::ReportSummary;

use crate::orchestrate::RunOutcome;

pub fn print_summary(summary: &ReportSummary) {
    println!("{}", summary_table(summary));
    for path in &summary.outputs {
        println!("Output: {}", path.display());
    }
}

pub fn print_run(outcome: &RunOutcome) {
    println!("{}", run_table(outcome));
    for stage in &outcome.stages {
        if let Some(summary) = &stage.summary {
            println!();
            print_summary(summary);
        }
    }
    let failed: Vec<_> = outcome.stages.iter().filter(|s| !s.is_success()).collect();
    if !failed.is_empty() {
        eprintln!("Errors:");
        for stage in failed {
            eprintln!("- {}: {}", stage.stage, stage.error.as_deref().unwrap_or("-"));
        }
    }
}

/// Rows read and written, followed by the report's own figures.
pub fn summary_table(summary: &ReportSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell(&summary.report), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("input rows"), Cell::new(summary.input_rows)]);
    table.add_row(vec![
        Cell::new("output rows"),
        Cell::new(summary.output_rows).add_attribute(Attribute::Bold),
    ]);
    for (name, value) in &summary.details {
        table.add_row(vec![dim_cell(name), Cell::new(value)]);
    }
    table
}

/// One row per stage of a sequence.
pub fn run_table(outcome: &RunOutcome) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Status"),
        header_cell("Input"),
        header_cell("Output"),
        header_cell("Files"),
    ]);
    apply_run_table_style(&mut table);
    for index in 2..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for stage in &outcome.stages {
        let row = match &stage.summary {
            Some(summary) => vec![
                Cell::new(stage.stage).add_attribute(Attribute::Bold),
                Cell::new("ok").fg(Color::Green),
                Cell::new(summary.input_rows),
                Cell::new(summary.output_rows),
                Cell::new(summary.outputs.len()),
            ],
            None => vec![
                Cell::new(stage.stage).add_attribute(Attribute::Bold),
                Cell::new("failed")
                    .fg(Color::Red)
                    .add_attribute(Attribute::Bold),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
            ],
        };
        table.add_row(row);
    }
    table
}

pub fn summary_json(summary: &ReportSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

pub fn run_json(outcome: &RunOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(outcome)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_run_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
