//! # siteport-data
//!
//! Tabular source readers for siteport - read CSV files and spreadsheet
//! workbooks into a header-keyed [`Table`] of typed [`Cell`]s.
//!
//! ## Features
//!
//! - **Excel Support**: `.xlsx`, `.xlsm`, `.xlsb`, `.xls` and `.ods` via `calamine`
//! - **CSV Support**: configurable delimiters and quoting via `csv`
//! - **Typed cells**: callers decide how to coerce numbers, dates and blanks
//!
//! ## Example
//!
//! ```rust,ignore
//! use siteport_data::{open_source, TableSource};
//!
//! let source = open_source("users.xlsx")?;
//! let table = source.read_table(None)?;
//! let email_col = table.require_column("Email")?;
//! ```

pub mod error;
pub mod sources;
pub mod table;

// Re-exports
pub use error::{DataError, Result};
pub use sources::{open_source, CsvOptions, CsvSource, ExcelSource, TableSource};
pub use table::{Cell, Record, Table};
