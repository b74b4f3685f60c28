//! Spreadsheet data source using calamine.
//!
//! Handles `.xlsx`, `.xlsm`, `.xlsb`, `.xls` and `.ods` workbooks through
//! calamine's format auto-detection.

use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use tracing::debug;

use crate::error::{DataError, Result};
use crate::sources::TableSource;
use crate::table::{trim_trailing_blank_rows, Cell, Table};

enum Origin {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Spreadsheet workbook data source
pub struct ExcelSource {
    origin: Origin,
    /// Sheet names cache
    sheet_names: Vec<String>,
}

impl ExcelSource {
    /// Create a new Excel source from a file path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }

        let workbook = open_workbook_auto(path)
            .map_err(|e| DataError::WorkbookOpen(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            sheet_names: workbook.sheet_names(),
            origin: Origin::Path(path.to_path_buf()),
        })
    }

    /// Create an Excel source over in-memory workbook bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();

        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.as_slice()))
            .map_err(|e| DataError::WorkbookOpen(e.to_string()))?;

        Ok(Self {
            sheet_names: workbook.sheet_names(),
            origin: Origin::Bytes(bytes),
        })
    }

    /// Get the default sheet name (the first one)
    pub fn default_sheet(&self) -> Option<&str> {
        self.sheet_names.first().map(String::as_str)
    }

    fn resolve_sheet(&self, sheet: Option<&str>) -> Result<String> {
        match sheet {
            Some(name) if self.sheet_names.iter().any(|s| s == name) => Ok(name.to_string()),
            Some(name) => Err(DataError::SheetNotFound(format!(
                "{} (available: {})",
                name,
                self.sheet_names.join(", ")
            ))),
            None => self
                .default_sheet()
                .map(str::to_string)
                .ok_or_else(|| DataError::SheetNotFound("No sheets in workbook".to_string())),
        }
    }

    /// Convert a calamine cell to a [`Cell`]
    fn convert_cell(cell: &Data) -> Cell {
        match cell {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::Error(e) => Cell::Error(format!("{:?}", e)),
            Data::DateTime(dt) => Cell::DateTime(format!("{}", dt)),
            Data::DateTimeIso(s) => Cell::DateTime(s.clone()),
            Data::DurationIso(s) => Cell::DateTime(s.clone()),
        }
    }

    /// Split a used range into header and body rows
    fn range_to_table(range: &Range<Data>) -> Table {
        let mut rows_iter = range.rows();

        let headers: Vec<String> = match rows_iter.next() {
            Some(header) => header.iter().map(|c| Self::convert_cell(c).display()).collect(),
            None => return Table::default(),
        };

        let mut rows: Vec<Vec<Cell>> = rows_iter
            .map(|row| row.iter().map(Self::convert_cell).collect())
            .collect();
        trim_trailing_blank_rows(&mut rows);

        Table::new(headers, rows)
    }

    fn read_from<RS: Read + Seek>(mut workbook: Sheets<RS>, sheet: &str) -> Result<Table> {
        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| DataError::SheetNotFound(format!("{}: {}", sheet, e)))?;

        let table = Self::range_to_table(&range);
        debug!(
            sheet,
            columns = table.headers.len(),
            rows = table.len(),
            "read worksheet"
        );
        Ok(table)
    }
}

impl TableSource for ExcelSource {
    fn read_table(&self, sheet: Option<&str>) -> Result<Table> {
        let sheet = self.resolve_sheet(sheet)?;

        // Re-open workbook for reading (calamine requires this pattern)
        match &self.origin {
            Origin::Path(path) => {
                let workbook = open_workbook_auto(path)
                    .map_err(|e| DataError::WorkbookOpen(format!("{}: {}", path.display(), e)))?;
                Self::read_from(workbook, &sheet)
            }
            Origin::Bytes(bytes) => {
                let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.as_slice()))
                    .map_err(|e| DataError::WorkbookOpen(e.to_string()))?;
                Self::read_from(workbook, &sheet)
            }
        }
    }

    fn list_sheets(&self) -> Result<Vec<String>> {
        Ok(self.sheet_names.clone())
    }
}
