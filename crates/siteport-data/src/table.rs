//! In-memory table model shared by all sources.

use crate::error::{DataError, Result};

/// A single cell value as read from a source
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Blank cell (or a field missing from a short row)
    Empty,
    /// Text value
    Text(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Date, time or duration, already rendered
    DateTime(String),
    /// Spreadsheet error value such as `#N/A`
    Error(String),
}

impl Cell {
    /// Borrow the cell as text. Only [`Cell::Text`] yields a value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True for [`Cell::Empty`] and for text that is empty
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Short name of the cell's kind, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Cell::Empty => "empty",
            Cell::Text(_) => "text",
            Cell::Int(_) => "integer",
            Cell::Float(_) => "float",
            Cell::Bool(_) => "boolean",
            Cell::DateTime(_) => "datetime",
            Cell::Error(_) => "error",
        }
    }

    /// Render any cell as a string
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => {
                // Format floats nicely (remove unnecessary decimals)
                if f.fract() == 0.0 {
                    format!("{:.0}", f)
                } else {
                    f.to_string()
                }
            }
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(s) => s.clone(),
            Cell::Error(e) => format!("#ERROR: {}", e),
        }
    }
}

static EMPTY: Cell = Cell::Empty;

/// A header row plus body rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Header names, trimmed
    pub headers: Vec<String>,
    /// Body rows. Rows may be shorter than the header.
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table from a header row and body rows
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let headers = headers
            .into_iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        Self { headers, rows }
    }

    /// Number of body rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no body rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column with this exact (case-sensitive) header
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like [`Table::column_index`] but fails with [`DataError::MissingColumn`]
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| DataError::MissingColumn {
                column: name.to_string(),
                found: self.headers.join(", "),
            })
    }

    /// Cell at (row, column); missing trailing cells read as [`Cell::Empty`]
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Iterate body rows as header-keyed records
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |cells| Record {
            headers: &self.headers,
            cells,
        })
    }
}

/// Borrowed view of one body row
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    headers: &'a [String],
    cells: &'a [Cell],
}

impl<'a> Record<'a> {
    /// Cell under the given header, if that header exists
    pub fn get(&self, header: &str) -> Option<&'a Cell> {
        let idx = self.headers.iter().position(|h| h == header)?;
        Some(self.cells.get(idx).unwrap_or(&EMPTY))
    }

    /// Header/cell pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Cell)> + 'a {
        let cells = self.cells;
        self.headers
            .iter()
            .enumerate()
            .map(move |(i, h)| (h.as_str(), cells.get(i).unwrap_or(&EMPTY)))
    }

    /// Raw cells of the row, in column order
    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }
}

/// Drop trailing rows whose cells are all empty
pub(crate) fn trim_trailing_blank_rows(rows: &mut Vec<Vec<Cell>>) {
    while rows
        .last()
        .is_some_and(|row| row.iter().all(Cell::is_empty))
    {
        rows.pop();
    }
}
