//! Configuration settings.
//!
//! Settings are loaded from `siteport.toml`:
//!
//! ```toml
//! [connection]
//! site_content_url = ""
//! auth = "pat"
//!
//! [convert]
//! output = "converted_users.csv"
//! sheet = "Users"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::convert::CONVERTED_FILE_NAME;
use crate::error::Result;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "siteport.toml";

/// How the operator authenticates against the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Personal access token
    #[default]
    Pat,
    /// Username and password
    Password,
}

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Site connection settings
    pub connection: ConnectionSettings,
    /// Role-mapping conversion settings
    pub convert: ConvertSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load settings from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Site content URL; empty selects the default site
    pub site_content_url: String,
    /// Authentication method
    pub auth: AuthMethod,
}

/// Conversion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertSettings {
    /// Output file for converted users
    pub output: PathBuf,
    /// Worksheet to read; the first sheet when unset
    pub sheet: Option<String>,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            output: PathBuf::from(CONVERTED_FILE_NAME),
            sheet: None,
        }
    }
}
