//! Plain-text rendering of previews, charts and per-file summaries.

use crate::app::session::FileSummary;
use crate::domain::model::{CellValue, Table};
use std::fmt::Write as _;

const MAX_CELL_WIDTH: usize = 24;

fn clip(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
    clipped.push('…');
    clipped
}

fn display_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Absent => "NaN".to_string(),
        other => clip(&other.to_string().replace(['\n', '\t'], " ")),
    }
}

/// Aligned grid with a row index column, like a dataframe preview.
pub fn render_table(table: &Table) -> String {
    if table.column_count() == 0 {
        return format!("(no columns selected, {} rows)\n", table.row_count());
    }

    let headers: Vec<String> = table.columns().iter().map(|c| clip(&c.name)).collect();
    let body: Vec<Vec<String>> = table
        .rows()
        .map(|row| row.into_iter().map(display_cell).collect())
        .collect();

    let index_width = table.row_count().saturating_sub(1).to_string().len();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            body.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let _ = write!(out, "{:>w$}", "", w = index_width);
    for (header, width) in headers.iter().zip(&widths) {
        let _ = write!(out, "  {:>w$}", header, w = *width);
    }
    out.push('\n');

    for (index, row) in body.iter().enumerate() {
        let _ = write!(out, "{:>w$}", index, w = index_width);
        for (cell, width) in row.iter().zip(&widths) {
            let _ = write!(out, "  {:>w$}", cell, w = *width);
        }
        out.push('\n');
    }
    out
}

/// One horizontal bar per row and numeric column, scaled to `width` characters.
pub fn render_bar_chart(table: &Table, width: usize) -> String {
    if table.column_count() == 0 {
        return "No numeric columns to chart\n".to_string();
    }

    let max_abs = table
        .columns()
        .iter()
        .flat_map(|c| c.values.iter().filter_map(CellValue::as_number))
        .filter(|n| n.is_finite())
        .fold(0.0f64, |acc, n| acc.max(n.abs()));

    let mut out = String::new();
    for column in table.columns() {
        let _ = writeln!(out, "{}", column.name);
        for (index, cell) in column.values.iter().enumerate() {
            let bar = match cell.as_number() {
                Some(n) if n.is_finite() && max_abs > 0.0 => {
                    let len = ((n.abs() / max_abs) * width as f64).round() as usize;
                    let glyph = if n < 0.0 { "-" } else { "█" };
                    format!("{} {}", glyph.repeat(len), cell)
                }
                Some(_) => cell.to_string(),
                None => "(missing)".to_string(),
            };
            let _ = writeln!(out, "  {:>4} | {}", index, bar);
        }
    }
    out
}

pub fn render_summary(summary: &FileSummary) -> String {
    let mut out = format!("📄 File: {} ({:.2} KB)", summary.name, summary.size_kb);
    match summary.kind {
        "table" => {
            let _ = write!(
                out,
                " - {} rows, columns: {}",
                summary.rows.unwrap_or(0),
                summary.columns.as_deref().unwrap_or(&[]).join(", ")
            );
        }
        "document" => {
            let _ = write!(out, " - {} paragraphs", summary.paragraphs.unwrap_or(0));
        }
        _ => {
            let _ = write!(out, "\n   ❌ {}", summary.error.as_deref().unwrap_or("failed"));
        }
    }
    out
}
