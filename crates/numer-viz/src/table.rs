#![forbid(unsafe_code)]

//! Tabular view of iteration results.
//!
//! Each entry of an array or record result becomes one row. Columns are the
//! fields of the first entry, in order. Numbers are printed with a fixed
//! number of fractional digits, except in the verbatim column (the
//! iteration counter).

use numer_core::Value;
use unicode_width::UnicodeWidthStr;

/// Shown instead of a table when the result has no rows.
pub const NO_TABLE_DATA: &str = "No Data for formatting table.";

/// Number formatting for [`TableView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFormat {
    /// Fractional digits for numeric cells.
    pub precision: usize,
    /// Column whose numbers are printed as-is.
    pub verbatim_column: String,
}

impl Default for TableFormat {
    fn default() -> Self {
        Self {
            precision: 9,
            verbatim_column: "iteration".to_owned(),
        }
    }
}

/// One formatted cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Number(String),
    Text(String),
    /// An array value, one entry per element.
    Vector(Vec<String>),
}

impl Cell {
    fn format(column: &str, value: &Value, format: &TableFormat) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Number(n) if column == format.verbatim_column => Self::Number(n.to_string()),
            Value::Number(n) => Self::Number(format!("{n:.prec$}", prec = format.precision)),
            Value::Text(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::Vector(items.iter().map(Value::to_string).collect()),
            Value::Record(_) => Self::Text(value.to_string()),
        }
    }

    /// Single-line text of the cell.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(s) | Self::Text(s) => s.clone(),
            Self::Vector(items) => format!("[{}]", items.join(", ")),
        }
    }
}

/// A row of cells, keyed by the entry's index or record key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub key: String,
    pub cells: Vec<Cell>,
}

/// A formatted table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl TableView {
    /// Tabulate `raw`, or `None` when it has no record entries.
    #[must_use]
    pub fn from_value(raw: &Value, format: &TableFormat) -> Option<Self> {
        let entries: Vec<(String, &Value)> = match raw {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            Value::Record(fields) => fields.iter().map(|(k, v)| (k.to_owned(), v)).collect(),
            _ => return None,
        };
        let (_, first) = entries.first()?;
        let columns: Vec<String> = first.as_record()?.keys().map(str::to_owned).collect();

        let rows = entries
            .into_iter()
            .map(|(key, entry)| TableRow {
                key,
                cells: columns
                    .iter()
                    .map(|column| {
                        entry
                            .as_record()
                            .and_then(|record| record.get(column))
                            .map_or(Cell::Empty, |value| Cell::format(column, value, format))
                    })
                    .collect(),
            })
            .collect();
        Some(Self { columns, rows })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Column titles as displayed (upper case).
    #[must_use]
    pub fn header_labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.to_uppercase()).collect()
    }

    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The cell at `row`, `column`.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.cells.get(index)
    }

    /// Plain-text rendering with columns aligned by display width.
    #[must_use]
    pub fn render_text(&self) -> String {
        let header = self.header_labels();
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.cells.iter().map(Cell::text).collect())
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.width()).collect();
        for line in &body {
            for (width, text) in widths.iter_mut().zip(line) {
                *width = (*width).max(text.width());
            }
        }

        let mut out = String::new();
        push_line(&mut out, &header, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, &rule, &widths);
        for line in &body {
            push_line(&mut out, line, &widths);
        }
        out
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, (text, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(text);
        line.push_str(&" ".repeat(width.saturating_sub(text.width())));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
