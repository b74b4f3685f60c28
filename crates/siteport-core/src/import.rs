//! Bulk import of users and groups.
//!
//! Import is split in two steps. Planning reads an uploaded table and decides,
//! row by row, what would be created and which rows are unusable. Execution
//! then attempts every planned item independently against a [`SiteClient`]:
//! a failed item is recorded and the batch continues. There is no rollback.

use serde::Serialize;
use siteport_data::{Record, Table};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::site::{with_session, Credentials, NewUser, SiteClient};

/// A row left out of a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based body row number
    pub row: usize,
    pub reason: String,
}

/// Users that would be added, and rows that were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserImportPlan {
    pub users: Vec<NewUser>,
    pub skipped: Vec<SkippedRow>,
}

/// Groups that would be created, and rows that were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupImportPlan {
    pub groups: Vec<String>,
    pub skipped: Vec<SkippedRow>,
}

/// An item the site rejected, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub name: String,
    pub error: String,
}

/// Outcome of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: Vec<String>,
    pub failed: Vec<ItemFailure>,
    pub skipped: Vec<SkippedRow>,
}

impl ImportSummary {
    /// True when every planned item was created
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Build a [`NewUser`] from one row, or explain why not
fn user_from_record(record: &Record<'_>) -> std::result::Result<NewUser, String> {
    let mut user = NewUser::default();
    let mut has_name = false;
    let mut has_role = false;

    for (header, cell) in record.iter() {
        if cell.is_empty() {
            continue;
        }
        let key = header.to_lowercase();
        let value = cell.display();
        match key.as_str() {
            "name" => {
                user.name = value;
                has_name = true;
            }
            "site_role" => {
                user.site_role = value;
                has_role = true;
            }
            "full_name" => user.full_name = Some(value),
            "email" => user.email = Some(value),
            "auth_setting" => user.auth_setting = Some(value),
            "external_auth_user_id" => user.external_auth_user_id = Some(value),
            "locale" => user.locale = Some(value),
            "password" => user.password = Some(value),
            "password_never_expires" => user.password_never_expires = Some(value),
            "must_change_password" => user.must_change_password = Some(value),
            "content_admin" => user.content_admin = Some(value),
            "server_role" => user.server_role = Some(value),
            "tags" => user.tags = Some(value),
            _ => {}
        }
    }

    match (has_name, has_role) {
        (true, true) => Ok(user),
        (false, true) => Err("missing 'name'".to_string()),
        (true, false) => Err("missing 'site_role'".to_string()),
        (false, false) => Err("missing 'name' and 'site_role'".to_string()),
    }
}

/// Plan a user import.
///
/// Column names are matched case-insensitively against the user attributes
/// (`name`, `site_role`, `full_name`, `email`, `auth_setting`,
/// `external_auth_user_id`, `locale`, `password`, `password_never_expires`,
/// `must_change_password`, `content_admin`, `server_role`, `tags`); other
/// columns are ignored and blank cells count as absent. When two columns
/// lowercase to the same key, the rightmost wins. Rows without both `name`
/// and `site_role` are skipped.
pub fn plan_user_import(table: &Table) -> UserImportPlan {
    let mut plan = UserImportPlan::default();

    for (i, record) in table.records().enumerate() {
        match user_from_record(&record) {
            Ok(user) => plan.users.push(user),
            Err(reason) => {
                warn!(row = i + 1, %reason, "skipping user row");
                plan.skipped.push(SkippedRow { row: i + 1, reason });
            }
        }
    }

    debug!(
        users = plan.users.len(),
        skipped = plan.skipped.len(),
        "planned user import"
    );
    plan
}

/// Plan a group import.
///
/// The group name is the first text cell in the row with non-blank content,
/// trimmed. Any column layout is accepted.
pub fn plan_group_import(table: &Table) -> GroupImportPlan {
    let mut plan = GroupImportPlan::default();

    for (i, record) in table.records().enumerate() {
        let name = record
            .cells()
            .iter()
            .filter_map(|cell| cell.as_text())
            .map(str::trim)
            .find(|s| !s.is_empty());

        match name {
            Some(name) => plan.groups.push(name.to_string()),
            None => {
                warn!(row = i + 1, "skipping row with no group name");
                plan.skipped.push(SkippedRow {
                    row: i + 1,
                    reason: "no valid group name".to_string(),
                });
            }
        }
    }

    plan
}

/// Add every planned user, one request each
pub fn run_user_import<C: SiteClient + ?Sized>(
    client: &mut C,
    credentials: &Credentials,
    plan: &UserImportPlan,
) -> Result<ImportSummary> {
    with_session(client, credentials, |client| -> Result<ImportSummary> {
        let mut summary = ImportSummary {
            skipped: plan.skipped.clone(),
            ..Default::default()
        };

        for user in &plan.users {
            match client.add_user(user) {
                Ok(()) => summary.created.push(user.name.clone()),
                Err(e) => {
                    warn!(user = %user.name, error = %e, "could not add user");
                    summary.failed.push(ItemFailure {
                        name: user.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            created = summary.created.len(),
            failed = summary.failed.len(),
            skipped = summary.skipped.len(),
            "user import finished"
        );
        Ok(summary)
    })
}

/// Create every planned group, one request each
pub fn run_group_import<C: SiteClient + ?Sized>(
    client: &mut C,
    credentials: &Credentials,
    plan: &GroupImportPlan,
) -> Result<ImportSummary> {
    with_session(client, credentials, |client| -> Result<ImportSummary> {
        let mut summary = ImportSummary {
            skipped: plan.skipped.clone(),
            ..Default::default()
        };

        for name in &plan.groups {
            match client.create_group(name) {
                Ok(()) => summary.created.push(name.clone()),
                Err(e) => {
                    warn!(group = %name, error = %e, "could not create group");
                    summary.failed.push(ItemFailure {
                        name: name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            created = summary.created.len(),
            failed = summary.failed.len(),
            "group import finished"
        );
        Ok(summary)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteport_data::Cell;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn table(headers: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        Table::new(headers.iter().map(|h| h.to_string()).collect(), rows)
    }

    #[test]
    fn test_user_keys_match_case_insensitively() {
        let t = table(
            &["Name", "SITE_ROLE", "Email", "Department"],
            vec![vec![text("alice"), text("Viewer"), text("a@x.com"), text("Sales")]],
        );
        let plan = plan_user_import(&t);

        assert!(plan.skipped.is_empty());
        assert_eq!(plan.users.len(), 1);
        let user = &plan.users[0];
        assert_eq!(user.name, "alice");
        assert_eq!(user.site_role, "Viewer");
        assert_eq!(user.email.as_deref(), Some("a@x.com"));
        assert!(user.full_name.is_none());
    }

    #[test]
    fn test_rows_missing_required_keys_are_skipped() {
        let t = table(
            &["name", "site_role"],
            vec![
                vec![text("alice"), Cell::Empty],
                vec![Cell::Empty, text("Viewer")],
                vec![text("carol"), text("Creator")],
                vec![],
            ],
        );
        let plan = plan_user_import(&t);

        assert_eq!(plan.users.len(), 1);
        assert_eq!(plan.users[0].name, "carol");
        assert_eq!(
            plan.skipped,
            vec![
                SkippedRow {
                    row: 1,
                    reason: "missing 'site_role'".to_string()
                },
                SkippedRow {
                    row: 2,
                    reason: "missing 'name'".to_string()
                },
                SkippedRow {
                    row: 4,
                    reason: "missing 'name' and 'site_role'".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_non_text_user_values_are_displayed() {
        let t = table(
            &["name", "site_role", "locale"],
            vec![vec![Cell::Int(1001), text("Viewer"), Cell::Float(2.0)]],
        );
        let plan = plan_user_import(&t);
        assert_eq!(plan.users[0].name, "1001");
        assert_eq!(plan.users[0].locale.as_deref(), Some("2"));
    }

    #[test]
    fn test_group_name_is_first_text_cell() {
        let t = table(
            &["id", "group", "note"],
            vec![
                vec![Cell::Int(1), text("  Finance  "), text("x")],
                vec![Cell::Empty, text("   "), text("Marketing")],
                vec![Cell::Float(3.0), Cell::Empty, Cell::Bool(true)],
            ],
        );
        let plan = plan_group_import(&t);

        assert_eq!(plan.groups, vec!["Finance", "Marketing"]);
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].row, 3);
    }
}
