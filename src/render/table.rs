//! Box-drawn tables sized to the available width.

use unicode_width::UnicodeWidthChar;

use crate::document::{Alignment, Inline, Table};
use crate::text::visible_width;
use crate::theme::MarkdownTheme;

/// Render `table` into at most `width` columns, header in bold.
///
/// The widest column gives up a column at a time until the table fits;
/// cells that no longer fit are truncated.
pub fn render_table(table: &Table, width: usize, theme: &MarkdownTheme) -> Vec<String> {
    let header: Vec<String> = table.header.iter().map(|cell| cell_text(cell)).collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell_text(cell)).collect())
        .collect();

    let num_cols = std::iter::once(header.len())
        .chain(rows.iter().map(Vec::len))
        .max()
        .unwrap_or(0);
    if num_cols == 0 {
        return Vec::new();
    }

    let mut col_widths = vec![1_usize; num_cols];
    for row in std::iter::once(&header).chain(rows.iter()) {
        for (idx, cell) in row.iter().enumerate() {
            col_widths[idx] = col_widths[idx].max(visible_width(cell));
        }
    }

    // Row width is 1 + sum(col_width + 3).
    let max_table_width = width.max(4);
    while 1 + col_widths.iter().sum::<usize>() + (3 * num_cols) > max_table_width {
        let Some((widest_idx, widest)) = col_widths
            .iter()
            .copied()
            .enumerate()
            .max_by_key(|(_, w)| *w)
        else {
            break;
        };
        if widest <= 1 {
            break;
        }
        col_widths[widest_idx] -= 1;
    }

    let mut lines = Vec::with_capacity(rows.len() + 5);
    lines.push(border(&col_widths, '┌', '┬', '┐'));
    if !table.header.is_empty() {
        lines.push(row_line(&header, &col_widths, &table.alignments, Some(theme)));
        lines.push(border(&col_widths, '├', '┼', '┤'));
    }
    for row in &rows {
        lines.push(row_line(row, &col_widths, &table.alignments, None));
    }
    lines.push(border(&col_widths, '└', '┴', '┘'));
    lines.push(String::new());
    lines
}

fn cell_text(cell: &[Inline]) -> String {
    Inline::plain_text(cell)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let mut out = String::new();
    out.push(left);
    for (idx, width) in widths.iter().enumerate() {
        out.push_str(&"─".repeat(width + 2));
        if idx + 1 < widths.len() {
            out.push(middle);
        }
    }
    out.push(right);
    out
}

fn row_line(
    cells: &[String],
    widths: &[usize],
    alignments: &[Alignment],
    header_theme: Option<&MarkdownTheme>,
) -> String {
    let mut out = String::new();
    out.push('│');
    for (idx, width) in widths.iter().enumerate() {
        let content = truncate(cells.get(idx).map_or("", String::as_str), *width);
        let padding = width.saturating_sub(visible_width(&content));
        let (left, right) = match alignments.get(idx).copied().unwrap_or_default() {
            Alignment::Right => (padding, 0),
            Alignment::Center => (padding / 2, padding - padding / 2),
            Alignment::Left | Alignment::None => (0, padding),
        };
        let padded = format!("{}{content}{}", " ".repeat(left), " ".repeat(right));

        out.push(' ');
        match header_theme {
            Some(theme) => out.push_str(&(theme.bold)(&padded)),
            None => out.push_str(&padded),
        }
        out.push(' ');
        out.push('│');
    }
    out
}

fn truncate(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0usize;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out
}
