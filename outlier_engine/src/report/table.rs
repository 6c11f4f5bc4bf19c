//! Fixed-width text tables.

use std::fmt;

/// Placeholder for a missing numeric cell.
pub const MISSING: &str = "N/A";

/// Line written instead of an empty table.
pub const EMPTY_TABLE: &str = "No outliers found in this category.";

/// A table column: header text and minimum width in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub min_width: usize,
}

impl Column {
    pub const fn new(header: &'static str, min_width: usize) -> Self {
        Self { header, min_width }
    }
}

/// A titled table of pre-formatted cells.
///
/// Cells are left-aligned and padded to the widest of header, cells and
/// minimum width; columns are joined with `" | "`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTable {
    title: String,
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new(title: impl Into<String>, columns: &[Column]) -> Self {
        Self {
            title: title.into(),
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Appends a row; missing trailing cells render empty.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(c, col)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(c))
                    .map(|cell| cell.chars().count())
                    .chain([col.header.chars().count(), col.min_width])
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

/// `===== title =====` with `width` signs on each side.
pub fn banner(title: &str, width: usize) -> String {
    let bar = "=".repeat(width);
    format!("{bar} {title} {bar}")
}

fn join_padded<'c>(cells: impl Iterator<Item = &'c str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

impl fmt::Display for TextTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f)?;
        writeln!(f, "{}", banner(&self.title, 25))?;
        if self.rows.is_empty() {
            return writeln!(f, "{EMPTY_TABLE}");
        }

        let widths = self.widths();
        let header = join_padded(self.columns.iter().map(|c| c.header), &widths);
        let rule = "-".repeat(header.chars().count());

        writeln!(f, "{rule}")?;
        writeln!(f, "{}", header.trim_end())?;
        writeln!(f, "{rule}")?;
        for row in &self.rows {
            let cells = (0..self.columns.len()).map(|c| row.get(c).map_or("", String::as_str));
            writeln!(f, "{}", join_padded(cells, &widths).trim_end())?;
        }
        writeln!(f, "{rule}")
    }
}

/// `12.35%`, or [`MISSING`].
pub fn percent(v: Option<f64>) -> String {
    v.map_or_else(|| MISSING.to_string(), |v| format!("{v:.2}%"))
}

/// Two decimals, or [`MISSING`].
pub fn decimal2(v: Option<f64>) -> String {
    v.map_or_else(|| MISSING.to_string(), |v| format!("{v:.2}"))
}

/// Four decimals, or [`MISSING`].
pub fn decimal4(v: Option<f64>) -> String {
    v.map_or_else(|| MISSING.to_string(), |v| format!("{v:.4}"))
}

/// Shortest round-trip representation, or [`MISSING`].
pub fn plain(v: Option<f64>) -> String {
    v.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}
