//! siteport CLI - Command-line interface library
//!
//! This library provides the CLI functionality for siteport, including:
//! - Convert: Map a user export to the role-mapping import CSV
//! - Plan: Preview bulk user and group imports
//! - Config: Show the effective configuration
//!
//! # Library Usage
//!
//! ```ignore
//! use siteport_cli::{convert_command, OutputFormat};
//!
//! let report = convert_command(&input, &output, None, OutputFormat::Text)?;
//! println!("{} users", report.records.len());
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Convert an Excel user export
//! siteport convert users.xlsx --output converted_users.csv
//!
//! # Preview a user import
//! siteport plan-users import.csv --format json
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{config_command, convert_command, plan_groups_command, plan_users_command};
pub use app::{run_cli, OutputFormat};
