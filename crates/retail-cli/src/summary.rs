//! Terminal tables for run results, clean reports and the domain list.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use retail_core::{CleanerRegistry, JobOutcome};
use retail_model::CleanReport;

use crate::app::RunResult;

pub fn print_run_summary(result: &RunResult) {
    let mode = if result.dry_run { " (dry run)" } else { "" };
    println!("Target: {}{mode}", result.target);
    println!("{}", run_table(result));
    if result.has_failures() {
        eprintln!("Errors:");
        for error in result.failures() {
            eprintln!("- {error}");
        }
    }
}

/// One row per job plus a total row.
pub fn run_table(result: &RunResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Domain"),
        header_cell("Table"),
        header_cell("Rows in"),
        header_cell("Rows out"),
        header_cell("Rejected"),
        header_cell("Nulled"),
        header_cell("Status"),
        header_cell("Time (ms)"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 6, CellAlignment::Center);
    align_column(&mut table, 7, CellAlignment::Right);

    let mut total_in = 0;
    let mut total_out = 0;
    let mut total_rejected = 0;
    let mut total_nulled = 0;
    for outcome in &result.outcomes {
        table.add_row(job_row(outcome, result.dry_run));
        if let Ok(job) = &outcome.result {
            total_in += job.report.rows_in;
            total_out += job.report.rows_out;
            total_rejected += job.report.total_rejected();
            total_nulled += job.report.total_nulled();
        }
    }
    let failed = result
        .outcomes
        .iter()
        .filter(|outcome| !outcome.is_success())
        .count();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_in).add_attribute(Attribute::Bold),
        Cell::new(total_out).add_attribute(Attribute::Bold),
        count_cell(total_rejected, Color::Yellow),
        count_cell(total_nulled, Color::Yellow),
        if failed > 0 {
            Cell::new(format!("{failed} failed"))
                .fg(Color::Red)
                .add_attribute(Attribute::Bold)
        } else {
            dim_cell("-")
        },
        dim_cell("-"),
    ]);
    table
}

fn job_row(outcome: &JobOutcome, dry_run: bool) -> Vec<Cell> {
    let domain = Cell::new(outcome.job.domain)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold);
    let target = Cell::new(outcome.job.target_table());
    match &outcome.result {
        Ok(job) => {
            let timings = job.timings;
            let status = if job.loaded {
                Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
            } else if dry_run {
                dim_cell("dry run")
            } else {
                dim_cell("-")
            };
            vec![
                domain,
                target,
                Cell::new(job.report.rows_in),
                Cell::new(job.report.rows_out),
                count_cell(job.report.total_rejected(), Color::Yellow),
                count_cell(job.report.total_nulled(), Color::Yellow),
                status,
                Cell::new(timings.extract_ms + timings.clean_ms + timings.load_ms),
            ]
        }
        Err(error) => vec![
            domain,
            target,
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            Cell::new(format!("{} failed", error.stage()))
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
            dim_cell("-"),
        ],
    }
}

/// Counters of one clean report, one row per reason or column.
pub fn report_table(report: &CleanReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Counter"),
        header_cell("Reason / column"),
        header_cell("Count"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);

    table.add_row(vec![Cell::new("rows in"), dim_cell("-"), Cell::new(report.rows_in)]);
    table.add_row(vec![Cell::new("rows out"), dim_cell("-"), Cell::new(report.rows_out)]);
    let groups = [
        ("rejected", &report.rejected),
        ("nulled", &report.nulled),
        ("repaired", &report.repaired),
        ("imputed", &report.imputed),
    ];
    for (label, counts) in groups {
        for (key, count) in counts {
            table.add_row(vec![Cell::new(label), Cell::new(key), Cell::new(count)]);
        }
    }
    table
}

pub fn domains_table(registry: &CleanerRegistry) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Domain", "Default table", "Description"]);
    apply_table_style(&mut table);
    for cleaner in registry.cleaners() {
        let domain = cleaner.domain();
        table.add_row(vec![
            domain.code(),
            domain.default_target_table(),
            cleaner.description(),
        ]);
    }
    table
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
        .set_width(140);
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

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
