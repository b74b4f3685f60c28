//! Error types for siteport-core.

use siteport_data::DataError;
use thiserror::Error;

use crate::site::SiteError;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that abort a whole operation
#[derive(Debug, Error)]
pub enum CoreError {
    /// The input table could not be read or lacks a required column
    #[error(transparent)]
    Data(#[from] DataError),

    /// Rendering CSV output failed
    #[error("Failed to write CSV: {0}")]
    CsvWrite(String),

    /// A site request that the operation cannot continue without failed
    #[error("Site request failed: {0}")]
    Site(#[from] SiteError),

    /// Project lookup by name failed
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Workbook lookup by name failed
    #[error("No workbook named '{name}' in project '{project}'")]
    WorkbookNotFound {
        /// Project searched
        project: String,
        /// Workbook name requested
        name: String,
    },

    /// A new project was requested without a name
    #[error("Project name must not be empty")]
    EmptyProjectName,

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        CoreError::CsvWrite(err.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::Config(err.to_string())
    }
}
