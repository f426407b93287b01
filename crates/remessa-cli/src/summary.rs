use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use remessa_cli::types::BatchResult;
use remessa_sequence::SequenceState;

pub fn print_summary(result: &BatchResult) {
    println!("{} batch: {}", result.kind, result.input.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Output"),
        header_cell("Variant"),
        header_cell("Records"),
        header_cell("First"),
        header_cell("Last"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for output in &result.outputs {
        let (first, last) = match &output.sequence {
            Some((first, last)) => (Cell::new(first), Cell::new(last)),
            None => (dim_cell("-"), dim_cell("-")),
        };
        table.add_row(vec![
            Cell::new(output.path.display()),
            Cell::new(&output.variant),
            count_cell(output.records),
            first,
            last,
        ]);
    }
    if result.outputs.len() > 1 {
        table.add_row(vec![
            Cell::new("TOTAL")
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
            dim_cell("-"),
            Cell::new(result.total_records()).add_attribute(Attribute::Bold),
            dim_cell("-"),
            dim_cell("-"),
        ]);
    }
    println!("{table}");
}

pub fn print_sequence_state(state: &SequenceState) {
    if state.is_empty() {
        println!("No sequence numbers issued.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Day"), header_cell("Last issued")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (day, last) in state.iter().rev() {
        table.add_row(vec![Cell::new(day), Cell::new(last)]);
    }
    println!("{table}");
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Green)
    } else {
        Cell::new(count).fg(Color::Yellow)
    }
}
