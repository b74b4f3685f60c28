//! siteport-core - Tableau site administration helpers
//!
//! Core library for siteport: role-mapping conversion of user exports,
//! inventory export, bulk user and group import, and workbook transfer.
//! Live site access is delegated to a [`SiteClient`] implementation.
//!
//! # Example
//!
//! ```
//! use siteport_core::{InputRow, RoleMappingConverter};
//!
//! let rows = vec![
//!     InputRow::new("a@x.com", "SiteAdministratorCreator"),
//!     InputRow::new("b@x.com", "Viewer"),
//! ];
//! let records = RoleMappingConverter::convert(&rows);
//! let csv = RoleMappingConverter::render(&records).unwrap();
//!
//! assert_eq!(csv, "a@x.com,,,Creator,site,True\nb@x.com,,,Viewer,None,False\n");
//! ```

pub mod artifact;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod import;
pub mod site;
pub mod workbooks;

// Re-export main types and functions
pub use artifact::{write_csv, Artifact, CSV_MIME, OCTET_STREAM_MIME};
pub use config::{AuthMethod, ConnectionSettings, ConvertSettings, Settings, CONFIG_FILE_NAME};
pub use convert::{
    map_role, AdminScope, ConversionReport, FieldCoercionIssue, InputRow, OutputRecord,
    RoleGrant, RoleMappingConverter, RoleRule, CONVERTED_FILE_NAME, EMAIL_COLUMN, ROLE_RULES,
    SITE_ROLE_COLUMN,
};
pub use error::{CoreError, Result};
pub use export::{export_all, export_inventory, render_inventory, Inventory, InventoryRow};
pub use import::{
    plan_group_import, plan_user_import, run_group_import, run_user_import, GroupImportPlan,
    ImportSummary, ItemFailure, SkippedRow, UserImportPlan,
};
pub use site::{
    with_session, Credentials, DatasourceItem, GroupItem, NewUser, ProjectItem, SiteClient,
    SiteError, UserItem, WorkbookItem,
};
pub use workbooks::{
    download_project_workbooks, download_workbook, download_workbooks, publish_name,
    search_workbooks, upload_workbooks, workbook_file_name, workbooks_in_project, DownloadReport,
    UploadReport, UploadTarget, WorkbookFile, WORKBOOK_EXTENSIONS,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
