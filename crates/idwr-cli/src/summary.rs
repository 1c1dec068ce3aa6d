use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use polars::prelude::DataFrame;

use idwr_cli::commands::{BuildReport, ParseReport};
use idwr_common::column_value_string;
use idwr_model::IdwrConfig;
use idwr_report::DiseaseCoverage;
use idwr_validate::ValidationSummary;

pub fn print_parse_report(report: &ParseReport) {
    println!("Dataset: {}", report.kind.catalog_name());
    println!("Output: {}", report.output.display());
    let mut table = Table::new();
    table.set_header(vec![header_cell("Files read"), header_cell("Records"), header_cell("Skipped")]);
    apply_summary_table_style(&mut table);
    table.add_row(vec![
        Cell::new(report.files_read),
        Cell::new(report.records).add_attribute(Attribute::Bold),
        count_cell(report.skipped.len(), Color::Yellow),
    ]);
    println!("{table}");

    if !report.skipped.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Path"), header_cell("Sheet"), header_cell("Reason")]);
        apply_table_style(&mut table);
        for skip in &report.skipped {
            table.add_row(vec![
                Cell::new(skip.path.display()),
                skip.sheet.map_or_else(|| dim_cell("-"), Cell::new),
                Cell::new(&skip.reason),
            ]);
        }
        println!();
        println!("Skipped:");
        println!("{table}");
    }

    if !report.mappings.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Raw name"), header_cell("Normalized")]);
        apply_table_style(&mut table);
        for (raw, canonical) in &report.mappings {
            table.add_row(vec![Cell::new(raw), Cell::new(canonical).fg(Color::Cyan)]);
        }
        println!();
        println!("Disease name mappings:");
        println!("{table}");
    }
}

pub fn print_build_report(report: &BuildReport) {
    let build = &report.build;
    match &report.output {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: (dry run)"),
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Rows")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (kind, rows) in &build.input_rows {
        table.add_row(vec![Cell::new(kind.catalog_name()), Cell::new(rows)]);
    }
    let merge = &build.merge;
    let years = merge
        .modern_years
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    table.add_row(vec![dim_cell("Modern years"), dim_cell(if years.is_empty() { "-".to_string() } else { years })]);
    table.add_row(vec![dim_cell("Historical rows dropped"), dim_cell(merge.historical_rows_dropped)]);
    table.add_row(vec![dim_cell("Sentinel rows dropped"), dim_cell(merge.sentinel_rows_dropped)]);
    table.add_row(vec![dim_cell("Duplicates removed"), dim_cell(merge.duplicates_removed)]);
    table.add_row(vec![
        Cell::new("UNIFIED").fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(build.frame.height()).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!("State: {}", build.state);
}

pub fn print_coverage(coverage: &[DiseaseCoverage]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Disease"),
        header_cell("First"),
        header_cell("Last"),
        header_cell("Sources"),
        header_cell("Total"),
        header_cell("Rows"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    for entry in coverage {
        let (first_year, first_week) = entry.first();
        let (last_year, last_week) = entry.last();
        table.add_row(vec![
            Cell::new(&entry.disease),
            Cell::new(format!("{first_year}-W{first_week:02}")),
            Cell::new(format!("{last_year}-W{last_week:02}")),
            Cell::new(entry.sources.iter().cloned().collect::<Vec<_>>().join(", ")),
            Cell::new(entry.total_count),
            Cell::new(entry.rows),
        ]);
    }
    println!("{table}");
}

pub fn print_frame(df: &DataFrame) {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(ToString::to_string)
        .collect();
    let mut table = Table::new();
    table.set_header(names.iter().map(String::as_str).map(header_cell).collect::<Vec<_>>());
    apply_table_style(&mut table);
    for idx in 0..df.height() {
        table.add_row(
            names
                .iter()
                .map(|name| Cell::new(column_value_string(df, name, idx)))
                .collect::<Vec<_>>(),
        );
    }
    println!("{table}");
    println!("{} rows", df.height());
}

pub fn print_validation(summary: &ValidationSummary) {
    println!("Rows: {}", summary.rows);
    let mut table = Table::new();
    table.set_header(vec![header_cell("Check"), header_cell("Status"), header_cell("Message")]);
    apply_table_style(&mut table);
    for check in &summary.checks {
        let status = if check.passed {
            Cell::new("ok").fg(Color::Green)
        } else {
            Cell::new("failed").fg(Color::Red).add_attribute(Attribute::Bold)
        };
        table.add_row(vec![
            Cell::new(check.check),
            status,
            check.message.as_deref().map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    println!("{table}");
}

pub fn print_list(values: &[String]) {
    for value in values {
        println!("{value}");
    }
}

pub fn print_config(config: &IdwrConfig) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
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
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
