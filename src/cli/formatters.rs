//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Style},
};

use crate::reports::{Cell, Column, ReportTable, Section, Style as ColumnStyle};
use crate::utils::{format_amount, format_count, format_grouped, format_percent};

fn format_number(value: Decimal, column: Column) -> String {
    let format = column.format();
    let text = match format.style {
        ColumnStyle::Percent => format_percent(value),
        ColumnStyle::Points => format_grouped(value, 2),
        ColumnStyle::Amount => format_amount(value),
        ColumnStyle::Count => format_count(value),
        ColumnStyle::Text => value.to_string(),
    };

    if !format.signed {
        text
    } else if value >= Decimal::ZERO {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

/// Display text of one cell under the column's rule
pub fn format_cell(cell: &Cell, column: Column) -> String {
    match cell {
        Cell::Number(value) => format_number(*value, column),
        Cell::Text(text) => text.clone(),
        Cell::Empty => "-".to_string(),
    }
}

/// Format one report table for terminal output
pub fn format_table(table: &ReportTable) -> String {
    let mut output = format!("\n{}\n", table.title.bold());

    if table.is_empty() {
        output.push_str(&format!("  {}\n", "No rows".dimmed()));
        return output;
    }

    let mut builder = Builder::default();
    builder.push_record(std::iter::once(table.index_name.clone()).chain(table.columns.iter().map(Column::header)));
    for row in &table.rows {
        let cells = row
            .cells
            .iter()
            .zip(&table.columns)
            .map(|(cell, column)| format_cell(cell, *column));
        builder.push_record(std::iter::once(row.label.clone()).chain(cells));
    }

    let mut rendered = builder.build();
    rendered.with(Style::modern());
    rendered.modify(Columns::new(1..), Alignment::right());
    for (i, column) in table.columns.iter().enumerate() {
        if column.format().style == ColumnStyle::Text {
            rendered.modify(Columns::new(i + 1..i + 2), Alignment::left());
        }
    }

    output.push_str(&rendered.to_string());
    output.push('\n');
    output
}

/// Format a whole section: heading, then every table
pub fn format_section(section: &Section) -> String {
    let mut output = format!("\n{} {}\n", "▶".cyan().bold(), section.title.cyan().bold());
    for table in &section.tables {
        output.push_str(&format_table(table));
    }
    output
}

#[derive(Serialize)]
struct JsonRow<'a> {
    label: &'a str,
    cells: &'a [Cell],
}

#[derive(Serialize)]
struct JsonTable<'a> {
    name: &'a str,
    title: &'a str,
    index: &'a str,
    columns: Vec<String>,
    rows: Vec<JsonRow<'a>>,
}

#[derive(Serialize)]
struct JsonSection<'a> {
    section: &'a str,
    title: &'a str,
    tables: Vec<JsonTable<'a>>,
}

/// Format sections for JSON output; decimals are emitted as strings
pub fn format_sections_json(sections: &[Section]) -> String {
    let json: Vec<JsonSection> = sections
        .iter()
        .map(|section| JsonSection {
            section: section.kind.dir(),
            title: &section.title,
            tables: section
                .tables
                .iter()
                .map(|table| JsonTable {
                    name: &table.name,
                    title: &table.title,
                    index: &table.index_name,
                    columns: table.columns.iter().map(Column::header).collect(),
                    rows: table
                        .rows
                        .iter()
                        .map(|row| JsonRow {
                            label: &row.label,
                            cells: &row.cells,
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    serde_json::to_string_pretty(&json)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// One line per written artifact
pub fn format_artifacts(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return String::new();
    }
    format!(
        "\n{} Wrote {} artifacts:\n{}\n",
        "✓".green().bold(),
        paths.len(),
        paths.iter().map(|p| format!("  {}", p.display())).join("\n")
    )
}
