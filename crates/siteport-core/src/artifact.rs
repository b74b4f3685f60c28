//! Downloadable artifacts and CSV text rendering.

use serde::Serialize;

use crate::error::{CoreError, Result};

/// MIME type for CSV artifacts
pub const CSV_MIME: &str = "text/csv";

/// MIME type for workbook binaries
pub const OCTET_STREAM_MIME: &str = "application/octet-stream";

/// A file offered to the operator for download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Suggested file name
    pub file_name: String,
    /// MIME type
    pub mime: &'static str,
    /// File content
    #[serde(skip)]
    pub body: Vec<u8>,
}

impl Artifact {
    /// Wrap CSV text as a `text/csv` artifact
    pub fn csv(file_name: impl Into<String>, text: String) -> Self {
        Self {
            file_name: file_name.into(),
            mime: CSV_MIME,
            body: text.into_bytes(),
        }
    }

    /// Wrap raw bytes as an `application/octet-stream` artifact
    pub fn binary(file_name: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: OCTET_STREAM_MIME,
            body,
        }
    }

    /// Body as UTF-8 text, if it is valid UTF-8
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Render rows as comma-separated text with `\n` line endings.
///
/// Fields are quoted only when they contain a delimiter, quote or line break.
pub fn write_csv<R, F>(header: Option<&[&str]>, rows: impl IntoIterator<Item = R>) -> Result<String>
where
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    if let Some(header) = header {
        writer.write_record(header)?;
    }
    for row in rows {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::CsvWrite(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CoreError::CsvWrite(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_csv_with_header() {
        let rows = vec![vec!["alice", "1"], vec!["bob", "2"]];
        let text = write_csv(Some(&["Name", "ID"]), rows).unwrap();
        assert_eq!(text, "Name,ID\nalice,1\nbob,2\n");
    }

    #[test]
    fn test_write_csv_quotes_only_when_needed() {
        let rows = vec![vec!["a,b", "say \"hi\"", "", "plain"]];
        let text = write_csv(None, rows).unwrap();
        assert_eq!(text, "\"a,b\",\"say \"\"hi\"\"\",,plain\n");
    }

    #[test]
    fn test_write_csv_empty() {
        let rows: Vec<Vec<&str>> = Vec::new();
        assert_eq!(write_csv(None, rows).unwrap(), "");
    }

    #[test]
    fn test_artifact_constructors() {
        let csv = Artifact::csv("users.csv", "a\n".to_string());
        assert_eq!(csv.mime, "text/csv");
        assert_eq!(csv.text(), Some("a\n"));

        let bin = Artifact::binary("Sales.twbx", vec![0, 159, 146, 150]);
        assert_eq!(bin.mime, "application/octet-stream");
        assert_eq!(bin.text(), None);
    }
}
