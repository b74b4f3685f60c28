//! CSV data source.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{DataError, Result};
use crate::sources::TableSource;
use crate::table::{Cell, Table};

/// Options for CSV parsing
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Whether to trim whitespace from body fields (headers are always trimmed)
    pub trim: bool,
    /// Whether to allow rows with differing column counts
    pub flexible: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: false,
            flexible: true,
        }
    }
}

impl CsvOptions {
    /// Create options for tab-separated values (TSV)
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Create options for semicolon-separated values (common in European locales)
    pub fn semicolon() -> Self {
        Self {
            delimiter: b';',
            ..Default::default()
        }
    }
}

enum Origin {
    Path(String),
    Bytes(Vec<u8>),
}

/// CSV data source, backed by a file or by uploaded bytes
pub struct CsvSource {
    origin: Origin,
    options: CsvOptions,
}

impl CsvSource {
    /// Create a new CSV source from a file path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, CsvOptions::default())
    }

    /// Create a new CSV source with custom options
    pub fn with_options(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();

        if !path.as_ref().exists() {
            return Err(DataError::FileNotFound(path_str));
        }

        Ok(Self {
            origin: Origin::Path(path_str),
            options,
        })
    }

    /// Create a CSV source over in-memory content, e.g. an uploaded file
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, options: CsvOptions) -> Self {
        Self {
            origin: Origin::Bytes(bytes.into()),
            options,
        }
    }

    fn parse<R: Read>(&self, reader: R) -> Result<Table> {
        let mut csv_reader = ::csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .has_headers(false) // We handle headers ourselves
            .trim(if self.options.trim {
                ::csv::Trim::Fields
            } else {
                ::csv::Trim::None
            })
            .flexible(self.options.flexible)
            .from_reader(reader);

        let mut records = csv_reader.records();

        let headers: Vec<String> = match records.next() {
            Some(header) => header?.iter().map(str::to_string).collect(),
            None => return Ok(Table::default()),
        };

        let mut rows = Vec::new();
        for record in records {
            let record = record?;
            let row: Vec<Cell> = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }

        debug!(columns = headers.len(), rows = rows.len(), "parsed CSV");
        Ok(Table::new(headers, rows))
    }
}

impl TableSource for CsvSource {
    fn read_table(&self, _sheet: Option<&str>) -> Result<Table> {
        // CSV doesn't have sheets, ignore the sheet parameter
        match &self.origin {
            Origin::Path(path) => {
                let file = File::open(path)?;
                self.parse(BufReader::new(file))
            }
            Origin::Bytes(bytes) => self.parse(bytes.as_slice()),
        }
    }

    fn list_sheets(&self) -> Result<Vec<String>> {
        // CSV files don't have sheets, return a single default sheet
        Ok(vec!["data".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_csv_read_table() {
        let file = create_test_csv("Email,Site Role\na@x.com,Viewer\nb@x.com,Creator\n");

        let source = CsvSource::new(file.path()).unwrap();
        let table = source.read_table(None).unwrap();

        assert_eq!(table.headers, vec!["Email", "Site Role"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], vec![text("a@x.com"), text("Viewer")]);
        assert_eq!(table.rows[1], vec![text("b@x.com"), text("Creator")]);
    }

    #[test]
    fn test_csv_empty_fields_are_empty_cells() {
        let source = CsvSource::from_bytes("Email,Site Role\n,Viewer\n", CsvOptions::default());
        let table = source.read_table(None).unwrap();

        assert_eq!(table.rows[0], vec![Cell::Empty, text("Viewer")]);
    }

    #[test]
    fn test_csv_empty_input() {
        let source = CsvSource::from_bytes("", CsvOptions::default());
        let table = source.read_table(None).unwrap();

        assert!(table.headers.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_csv_header_only() {
        let source = CsvSource::from_bytes("Email,Site Role\n", CsvOptions::default());
        let table = source.read_table(None).unwrap();

        assert_eq!(table.headers.len(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn test_csv_tsv() {
        let source = CsvSource::from_bytes("Name\tSite Role\nalice\tViewer\n", CsvOptions::tsv());
        let table = source.read_table(None).unwrap();

        assert_eq!(table.headers, vec!["Name", "Site Role"]);
        assert_eq!(table.rows[0][1], text("Viewer"));
    }

    #[test]
    fn test_csv_semicolon() {
        let source = CsvSource::from_bytes("Name;Age\nAlice;30\n", CsvOptions::semicolon());
        let table = source.read_table(None).unwrap();

        assert_eq!(table.headers, vec!["Name", "Age"]);
        assert_eq!(table.rows[0], vec![text("Alice"), text("30")]);
    }

    #[test]
    fn test_csv_quoted_fields() {
        let csv_content = r#"Name,Description
"Alice","A ""quoted"" value"
"Bob","Value with, comma"
"#;
        let source = CsvSource::from_bytes(csv_content, CsvOptions::default());
        let table = source.read_table(None).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][1], text(r#"A "quoted" value"#));
        assert_eq!(table.rows[1][1], text("Value with, comma"));
    }

    #[test]
    fn test_csv_body_fields_kept_verbatim_by_default() {
        let source = CsvSource::from_bytes(" Email , Site Role \n a@x.com ,Viewer\n", CsvOptions::default());
        let table = source.read_table(None).unwrap();

        assert_eq!(table.headers, vec!["Email", "Site Role"]);
        assert_eq!(table.rows[0][0], text(" a@x.com "));
    }

    #[test]
    fn test_csv_trim_option() {
        let options = CsvOptions {
            trim: true,
            ..Default::default()
        };
        let source = CsvSource::from_bytes("Email\n  a@x.com  \n", options);
        let table = source.read_table(None).unwrap();

        assert_eq!(table.rows[0][0], text("a@x.com"));
    }

    #[test]
    fn test_csv_empty_field_rows_are_kept_anywhere() {
        let trailing = CsvSource::from_bytes("Email,Site Role\na@x.com,Viewer\n,\n", CsvOptions::default())
            .read_table(None)
            .unwrap();
        let leading = CsvSource::from_bytes("Email,Site Role\n,\na@x.com,Viewer\n", CsvOptions::default())
            .read_table(None)
            .unwrap();

        assert_eq!(trailing.len(), 2);
        assert_eq!(leading.len(), 2);
        assert_eq!(trailing.rows[1], vec![Cell::Empty, Cell::Empty]);
    }

    #[test]
    fn test_csv_blank_lines_are_skipped() {
        let source = CsvSource::from_bytes("Email,Site Role\na@x.com,Viewer\n\n\n", CsvOptions::default());
        let table = source.read_table(None).unwrap();

        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_csv_strict_column_count() {
        let options = CsvOptions {
            flexible: false,
            ..Default::default()
        };
        let source = CsvSource::from_bytes("A,B\n1,2,3\n", options);
        assert!(matches!(source.read_table(None), Err(DataError::Csv(_))));
    }

    #[test]
    fn test_csv_list_sheets() {
        let source = CsvSource::from_bytes("A,B\n1,2\n", CsvOptions::default());
        assert_eq!(source.list_sheets().unwrap(), vec!["data".to_string()]);
    }

    #[test]
    fn test_csv_file_not_found() {
        let result = CsvSource::new("/nonexistent/path/file.csv");
        assert!(matches!(result, Err(DataError::FileNotFound(_))));
    }
}
