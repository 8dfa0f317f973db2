use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::pipeline::{LoadReport, StageReport};

pub fn print_load_summary(report: &LoadReport) {
    println!("{}", load_summary_table(report));
    for stage in report.stages() {
        if let Some(failure) = &stage.failure {
            eprintln!("- {}: {failure}", stage.stage);
        }
    }
}

/// Per-stage read/loaded/skipped/failed counts with a total row.
pub fn load_summary_table(report: &LoadReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Read"),
        header_cell("Loaded"),
        header_cell("Skipped"),
        header_cell("Failed"),
        header_cell("Time (s)"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut total_read = 0usize;
    let mut total_skipped = 0usize;
    let mut total_failed = 0usize;
    for stage in report.stages() {
        total_read += stage.rows_read;
        total_skipped += stage.skipped();
        total_failed += stage.failed();
        table.add_row(stage_row(stage));
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_read).add_attribute(Attribute::Bold),
        Cell::new(report.total_persisted()).add_attribute(Attribute::Bold),
        count_cell(total_skipped, Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(total_failed, Color::Red).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    table
}

fn stage_row(stage: &StageReport) -> Vec<Cell> {
    let name = if stage.failure.is_some() {
        Cell::new(format!("{} (not read)", stage.stage)).fg(Color::Red)
    } else {
        Cell::new(stage.stage.label())
    };
    vec![
        name,
        Cell::new(stage.rows_read),
        Cell::new(stage.persisted),
        count_cell(stage.skipped(), Color::Yellow),
        count_cell(stage.failed(), Color::Red),
        dim_cell(format!("{:.2}", stage.elapsed.as_secs_f64())),
    ]
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
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
