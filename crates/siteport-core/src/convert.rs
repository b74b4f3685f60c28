//! Role-mapping converter.
//!
//! Turns a user export (one row per user, with `Email` and `Site Role`
//! columns) into the headerless six-column CSV expected by the user import:
//!
//! ```text
//! email,,,simplified_role,admin_scope,can_publish
//! ```
//!
//! Site roles are mapped by [`ROLE_RULES`], an ordered table of substring
//! patterns where the first match wins. Roles matching no pattern pass
//! through unchanged with no admin scope and no publish right.

use std::fmt;

use serde::Serialize;
use siteport_data::{Cell, Table, TableSource};
use tracing::{debug, info, warn};

use crate::artifact::{write_csv, Artifact};
use crate::error::Result;

/// Header of the email column in the input
pub const EMAIL_COLUMN: &str = "Email";

/// Header of the site role column in the input
pub const SITE_ROLE_COLUMN: &str = "Site Role";

/// Suggested file name for the converted output
pub const CONVERTED_FILE_NAME: &str = "converted_users.csv";

/// Whether a role carries site administration rights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdminScope {
    /// Site administrator
    Site,
    /// No administrative scope
    Unscoped,
}

impl AdminScope {
    /// Label written to the output (`site` or `None`)
    pub fn as_str(self) -> &'static str {
        match self {
            AdminScope::Site => "site",
            AdminScope::Unscoped => "None",
        }
    }
}

/// Result of mapping one site role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleGrant<'a> {
    pub simplified_role: &'a str,
    pub admin_scope: AdminScope,
    pub can_publish: bool,
}

/// One row of the mapping table
#[derive(Debug, Clone, Copy)]
pub struct RoleRule {
    /// Substring searched for in the site role (case-sensitive)
    pub pattern: &'static str,
    /// Grant applied when the pattern matches
    pub grant: RoleGrant<'static>,
}

/// Mapping table, evaluated top to bottom.
pub const ROLE_RULES: &[RoleRule] = &[
    RoleRule {
        pattern: "SiteAdministratorCreator",
        grant: RoleGrant {
            simplified_role: "Creator",
            admin_scope: AdminScope::Site,
            can_publish: true,
        },
    },
    RoleRule {
        pattern: "ExplorerCanPublish",
        grant: RoleGrant {
            simplified_role: "Explorer",
            admin_scope: AdminScope::Unscoped,
            can_publish: true,
        },
    },
    RoleRule {
        pattern: "Viewer",
        grant: RoleGrant {
            simplified_role: "Viewer",
            admin_scope: AdminScope::Unscoped,
            can_publish: false,
        },
    },
    RoleRule {
        pattern: "SiteAdministratorExplorer",
        grant: RoleGrant {
            simplified_role: "Explorer",
            admin_scope: AdminScope::Site,
            can_publish: true,
        },
    },
];

/// Map a site role through [`ROLE_RULES`].
///
/// Unmatched roles (including the empty string) pass through verbatim.
pub fn map_role(site_role: &str) -> RoleGrant<'_> {
    match ROLE_RULES
        .iter()
        .find(|rule| site_role.contains(rule.pattern))
    {
        Some(rule) => rule.grant,
        None => RoleGrant {
            simplified_role: site_role,
            admin_scope: AdminScope::Unscoped,
            can_publish: false,
        },
    }
}

/// One input row, after coercion at the table boundary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRow {
    pub email: Option<String>,
    pub site_role: Option<String>,
}

impl InputRow {
    pub fn new(email: impl Into<String>, site_role: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            site_role: Some(site_role.into()),
        }
    }

    /// Email, empty when missing
    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    /// Site role, empty when missing
    pub fn site_role(&self) -> &str {
        self.site_role.as_deref().unwrap_or_default()
    }
}

/// One row of converted output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    pub email: String,
    pub simplified_role: String,
    pub admin_scope: AdminScope,
    pub can_publish: bool,
}

impl OutputRecord {
    /// Derive the output record for one input row
    pub fn from_input(row: &InputRow) -> Self {
        let grant = map_role(row.site_role());
        Self {
            email: row.email().to_string(),
            simplified_role: grant.simplified_role.to_string(),
            admin_scope: grant.admin_scope,
            can_publish: grant.can_publish,
        }
    }

    /// The six positional output fields
    pub fn fields(&self) -> [&str; 6] {
        [
            self.email.as_str(),
            "",
            "",
            self.simplified_role.as_str(),
            self.admin_scope.as_str(),
            if self.can_publish { "True" } else { "False" },
        ]
    }
}

/// A cell that held something other than text and was read as empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCoercionIssue {
    /// 1-based body row number (the header is not counted)
    pub row: usize,
    pub column: &'static str,
    /// Kind of value found, e.g. `float`
    pub found: &'static str,
    /// The value as displayed
    pub value: String,
}

impl fmt::Display for FieldCoercionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}: '{}' holds {} value '{}', treated as empty",
            self.row, self.column, self.found, self.value
        )
    }
}

/// Converted records plus the coercions applied to produce them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub records: Vec<OutputRecord>,
    pub issues: Vec<FieldCoercionIssue>,
}

impl ConversionReport {
    /// Render the records as headerless CSV
    pub fn to_csv(&self) -> Result<String> {
        RoleMappingConverter::render(&self.records)
    }

    /// Render the records as the `converted_users.csv` artifact
    pub fn to_artifact(&self) -> Result<Artifact> {
        Ok(Artifact::csv(CONVERTED_FILE_NAME, self.to_csv()?))
    }
}

/// Coerce a cell to optional text, recording an issue for non-text values
fn coerce_text(
    cell: &Cell,
    row: usize,
    column: &'static str,
    issues: &mut Vec<FieldCoercionIssue>,
) -> Option<String> {
    match cell {
        Cell::Text(s) => Some(s.clone()),
        Cell::Empty => None,
        other => {
            let issue = FieldCoercionIssue {
                row,
                column,
                found: other.kind(),
                value: other.display(),
            };
            warn!("{}", issue);
            issues.push(issue);
            None
        }
    }
}

/// Converts user exports into import-ready role CSV
pub struct RoleMappingConverter;

impl RoleMappingConverter {
    /// Extract [`InputRow`]s from a table.
    ///
    /// Fails if either the `Email` or `Site Role` column is absent. Non-text
    /// cells become `None` and are reported as coercion issues.
    pub fn rows_from_table(table: &Table) -> Result<(Vec<InputRow>, Vec<FieldCoercionIssue>)> {
        let email_col = table.require_column(EMAIL_COLUMN)?;
        let role_col = table.require_column(SITE_ROLE_COLUMN)?;

        let mut issues = Vec::new();
        let rows = (0..table.len())
            .map(|i| InputRow {
                email: coerce_text(table.cell(i, email_col), i + 1, EMAIL_COLUMN, &mut issues),
                site_role: coerce_text(
                    table.cell(i, role_col),
                    i + 1,
                    SITE_ROLE_COLUMN,
                    &mut issues,
                ),
            })
            .collect();

        Ok((rows, issues))
    }

    /// Map every input row, preserving order and count
    pub fn convert(rows: &[InputRow]) -> Vec<OutputRecord> {
        rows.iter().map(OutputRecord::from_input).collect()
    }

    /// Render records as headerless CSV
    pub fn render(records: &[OutputRecord]) -> Result<String> {
        write_csv(None, records.iter().map(OutputRecord::fields))
    }

    /// Convert a whole table
    pub fn convert_table(table: &Table) -> Result<ConversionReport> {
        let (rows, issues) = Self::rows_from_table(table)?;
        let records = Self::convert(&rows);
        debug!(rows = records.len(), issues = issues.len(), "converted table");
        Ok(ConversionReport { records, issues })
    }

    /// Read a sheet from a source and convert it
    pub fn convert_source(
        source: &dyn TableSource,
        sheet: Option<&str>,
    ) -> Result<ConversionReport> {
        let table = source.read_table(sheet)?;
        let report = Self::convert_table(&table)?;
        info!(
            users = report.records.len(),
            coerced = report.issues.len(),
            "role mapping complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert_one(email: &str, role: &str) -> String {
        let records = RoleMappingConverter::convert(&[InputRow::new(email, role)]);
        RoleMappingConverter::render(&records).unwrap()
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_known_roles() {
        assert_eq!(
            convert_one("a@x.com", "SiteAdministratorCreator"),
            "a@x.com,,,Creator,site,True\n"
        );
        assert_eq!(
            convert_one("b@x.com", "ExplorerCanPublish"),
            "b@x.com,,,Explorer,None,True\n"
        );
        assert_eq!(convert_one("c@x.com", "Viewer"), "c@x.com,,,Viewer,None,False\n");
        assert_eq!(
            convert_one("d@x.com", "SiteAdministratorExplorer"),
            "d@x.com,,,Explorer,site,True\n"
        );
    }

    #[test]
    fn test_unknown_role_passes_through() {
        assert_eq!(
            convert_one("e@x.com", "Unlicensed"),
            "e@x.com,,,Unlicensed,None,False\n"
        );
        assert_eq!(
            convert_one("f@x.com", "SiteAdministrator"),
            "f@x.com,,,SiteAdministrator,None,False\n"
        );
    }

    #[test]
    fn test_matching_is_substring_and_case_sensitive() {
        let grant = map_role("ReadOnlyViewerLegacy");
        assert_eq!(grant.simplified_role, "Viewer");

        let grant = map_role("viewer");
        assert_eq!(grant.simplified_role, "viewer");
        assert_eq!(grant.admin_scope, AdminScope::Unscoped);
        assert!(!grant.can_publish);
    }

    #[test]
    fn test_first_match_wins() {
        // Contains both "ExplorerCanPublish" and "Viewer"; the earlier rule applies
        let grant = map_role("ExplorerCanPublishViewer");
        assert_eq!(grant.simplified_role, "Explorer");
        assert!(grant.can_publish);

        // "Viewer" precedes "SiteAdministratorExplorer" in the table
        let grant = map_role("SiteAdministratorExplorerViewer");
        assert_eq!(grant.simplified_role, "Viewer");
        assert_eq!(grant.admin_scope, AdminScope::Unscoped);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let records = RoleMappingConverter::convert(&[InputRow::default()]);
        assert_eq!(records[0].fields(), ["", "", "", "", "None", "False"]);
        assert_eq!(RoleMappingConverter::render(&records).unwrap(), ",,,,None,False\n");
    }

    #[test]
    fn test_empty_input_renders_empty_body() {
        let records = RoleMappingConverter::convert(&[]);
        assert!(records.is_empty());
        assert_eq!(RoleMappingConverter::render(&records).unwrap(), "");
    }

    #[test]
    fn test_email_with_delimiter_is_quoted() {
        assert_eq!(
            convert_one("odd,name@x.com", "Viewer"),
            "\"odd,name@x.com\",,,Viewer,None,False\n"
        );
    }

    #[test]
    fn test_rows_from_table_coerces_non_text() {
        let table = Table::new(
            vec!["Name".to_string(), "Email".to_string(), "Site Role".to_string()],
            vec![
                vec![text("alice"), text("a@x.com"), text("Viewer")],
                vec![text("bob"), Cell::Int(7), Cell::Float(2.5)],
                vec![text("carol")],
            ],
        );

        let (rows, issues) = RoleMappingConverter::rows_from_table(&table).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], InputRow::new("a@x.com", "Viewer"));
        assert_eq!(rows[1], InputRow::default());
        assert_eq!(rows[2], InputRow::default());

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].row, 2);
        assert_eq!(issues[0].column, "Email");
        assert_eq!(issues[0].found, "integer");
        assert_eq!(issues[1].column, "Site Role");
        assert_eq!(issues[1].value, "2.5");
        assert_eq!(
            issues[1].to_string(),
            "row 2: 'Site Role' holds float value '2.5', treated as empty"
        );
    }

    #[test]
    fn test_missing_column_fails_whole_conversion() {
        let table = Table::new(
            vec!["Email".to_string(), "Role".to_string()],
            vec![vec![text("a@x.com"), text("Viewer")]],
        );
        let err = RoleMappingConverter::convert_table(&table).unwrap_err();
        assert!(err.to_string().contains("Site Role"));
    }

    #[test]
    fn test_repeated_conversion_is_identical() {
        let table = Table::new(
            vec!["Email".to_string(), "Site Role".to_string()],
            vec![
                vec![text("a@x.com"), text("SiteAdministratorExplorer")],
                vec![Cell::Empty, Cell::Empty],
                vec![text("b@x.com"), text("Unlicensed")],
                vec![Cell::Bool(true), text("Viewer")],
                vec![text("c@x.com"), Cell::DateTime("2024-01-01".to_string())],
                vec![text("a@x.com"), text("SiteAdministratorExplorer")],
            ],
        );

        let first = RoleMappingConverter::convert_table(&table).unwrap();
        let second = RoleMappingConverter::convert_table(&table).unwrap();

        assert_eq!(first.records.len(), table.len());
        assert_eq!(first, second);
        assert_eq!(first.to_csv().unwrap(), second.to_csv().unwrap());
        assert_eq!(
            first.to_csv().unwrap(),
            "a@x.com,,,Explorer,site,True\n\
             ,,,,None,False\n\
             b@x.com,,,Unlicensed,None,False\n\
             ,,,Viewer,None,False\n\
             c@x.com,,,,None,False\n\
             a@x.com,,,Explorer,site,True\n"
        );
    }

    #[test]
    fn test_report_artifact() {
        let table = Table::new(
            vec!["Email".to_string(), "Site Role".to_string()],
            vec![vec![text("a@x.com"), text("SiteAdministratorCreator")]],
        );
        let report = RoleMappingConverter::convert_table(&table).unwrap();
        let artifact = report.to_artifact().unwrap();

        assert_eq!(artifact.file_name, "converted_users.csv");
        assert_eq!(artifact.mime, "text/csv");
        assert_eq!(artifact.text(), Some("a@x.com,,,Creator,site,True\n"));
    }
}
