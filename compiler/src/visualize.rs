//! Bit layout rendering: human-readable tables showing field positions,
//! widths, and constraints.

use bitschema_schema::{iso, FieldKind};

use crate::layout::{FieldLayout, Layout};

/// Table flavors for [render_layout]: a boxed ASCII grid for consoles and
/// logs, GitHub-flavored Markdown for docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Ascii,
    Markdown,
}

const HEADERS: [&str; 5] = ["Field", "Type", "Bit Range", "Bits", "Constraints"];

/// Renders the layout as a table, one row per field in declaration order.
pub fn render_layout(layout: &Layout, format: TableFormat) -> String {
    let rows: Vec<[String; 5]> = layout
        .fields
        .iter()
        .map(|field| {
            [
                field.name.clone(),
                field.kind.tag().to_owned(),
                format_bit_range(field),
                field.bits.to_string(),
                format_constraints(field),
            ]
        })
        .collect();

    let mut widths: [usize; 5] = [0; 5];
    for (width, header) in widths.iter_mut().zip(HEADERS) {
        *width = header.len();
    }
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    match format {
        TableFormat::Ascii => render_grid(&rows, &widths),
        TableFormat::Markdown => render_markdown(&rows, &widths),
    }
}

/// Inclusive `offset:end` bit range; `-` for zero-width constants.
pub fn format_bit_range(field: &FieldLayout) -> String {
    if field.bits == 0 {
        return "-".to_owned();
    }
    format!("{}:{}", field.offset, field.offset + field.bits - 1)
}

/// Human-friendly constraint column, with a `(nullable)` suffix when
/// applicable.
pub fn format_constraints(field: &FieldLayout) -> String {
    let base = match &field.kind {
        FieldKind::Bool => "-".to_owned(),
        FieldKind::Int { min, max, .. } => format!("[{min}..{max}]"),
        FieldKind::Enum { values } => format!("{} values", values.len()),
        FieldKind::Date {
            resolution,
            min,
            max,
        } => format!(
            "{}..{} ({})",
            iso::format_bound(*min, *resolution),
            iso::format_bound(*max, *resolution),
            resolution.as_str()
        ),
        FieldKind::Bitmask { flags } => {
            let names: Vec<&str> = flags.iter().map(|(name, _)| name.as_str()).collect();
            format!("{} flags: {}", flags.len(), names.join(", "))
        }
    };
    if field.nullable {
        format!("{base} (nullable)")
    } else {
        base
    }
}

fn format_row(cells: &[String; 5], widths: &[usize; 5]) -> String {
    let mut line = String::new();
    for (cell, width) in cells.iter().zip(widths) {
        let width = *width;
        line.push_str(&format!("| {cell:<width$} "));
    }
    line.push('|');
    line
}

fn border(widths: &[usize; 5], fill: char) -> String {
    let mut line = String::new();
    for width in widths {
        line.push('+');
        line.push_str(&fill.to_string().repeat(width + 2));
    }
    line.push('+');
    line
}

fn render_grid(rows: &[[String; 5]], widths: &[usize; 5]) -> String {
    let headers: [String; 5] = HEADERS.map(str::to_owned);
    let mut lines = Vec::new();
    lines.push(border(widths, '-'));
    lines.push(format_row(&headers, widths));
    lines.push(border(widths, '='));
    for row in rows {
        lines.push(format_row(row, widths));
        lines.push(border(widths, '-'));
    }
    lines.join("\n")
}

fn render_markdown(rows: &[[String; 5]], widths: &[usize; 5]) -> String {
    let headers: [String; 5] = HEADERS.map(str::to_owned);
    let mut lines = Vec::new();
    lines.push(format_row(&headers, widths));
    let separator: Vec<String> = widths.iter().map(|width| "-".repeat(width + 2)).collect();
    lines.push(format!("|{}|", separator.join("|")));
    for row in rows {
        lines.push(format_row(row, widths));
    }
    lines.join("\n")
}
