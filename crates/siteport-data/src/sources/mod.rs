//! Data source implementations.
//!
//! This module contains adapters for the tabular formats siteport accepts
//! (CSV and spreadsheet workbooks).

pub mod csv;
pub mod excel;

use std::path::Path;

pub use self::csv::{CsvOptions, CsvSource};
pub use self::excel::ExcelSource;

use crate::error::{DataError, Result};
use crate::table::Table;

/// Trait for sources that can provide a header-keyed table
pub trait TableSource {
    /// Read one sheet as a table, the first row being the header
    ///
    /// # Arguments
    /// * `sheet` - Sheet name (for multi-sheet sources), `None` for the default
    fn read_table(&self, sheet: Option<&str>) -> Result<Table>;

    /// List available sheets/tables in the source
    fn list_sheets(&self) -> Result<Vec<String>>;
}

/// Workbook extensions handled by calamine
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Open a source, picking the reader from the file extension
pub fn open_source(path: impl AsRef<Path>) -> Result<Box<dyn TableSource>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => Ok(Box::new(CsvSource::new(path)?)),
        "tsv" => Ok(Box::new(CsvSource::with_options(path, CsvOptions::tsv())?)),
        e if WORKBOOK_EXTENSIONS.contains(&e) => Ok(Box::new(ExcelSource::new(path)?)),
        _ => Err(DataError::UnsupportedFormat(path.display().to_string())),
    }
}
