//! Inventory export.
//!
//! Each [`Inventory`] lists one kind of site content and renders it as a CSV
//! file with a header row.

use serde::Serialize;
use tracing::info;

use crate::artifact::{write_csv, Artifact};
use crate::error::Result;
use crate::site::{
    with_session, Credentials, DatasourceItem, GroupItem, ProjectItem, SiteClient, UserItem,
    WorkbookItem,
};

/// Kinds of site content that can be exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Inventory {
    Users,
    Groups,
    Projects,
    Workbooks,
    Datasources,
}

impl Inventory {
    /// All inventories, in export order
    pub const ALL: [Inventory; 5] = [
        Inventory::Users,
        Inventory::Groups,
        Inventory::Projects,
        Inventory::Workbooks,
        Inventory::Datasources,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Inventory::Users => "users.csv",
            Inventory::Groups => "groups.csv",
            Inventory::Projects => "projects.csv",
            Inventory::Workbooks => "workbooks.csv",
            Inventory::Datasources => "datasources.csv",
        }
    }

    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Inventory::Users => &["Name", "Full Name", "Email", "Site Role", "Last Login"],
            Inventory::Groups => &["Group Name", "Group ID"],
            Inventory::Projects => &["Name", "Description", "Content Permissions"],
            Inventory::Workbooks => &[
                "Workbook Name",
                "Owner ID",
                "Project",
                "Created At",
                "Updated At",
            ],
            Inventory::Datasources => &[
                "Datasource Name",
                "Owner ID",
                "Project",
                "Created At",
                "Updated At",
            ],
        }
    }
}

/// A site object that renders as one inventory row
pub trait InventoryRow {
    /// Cells in the order of the inventory's headers
    fn cells(&self) -> Vec<String>;
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl InventoryRow for UserItem {
    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            opt(&self.full_name),
            opt(&self.email),
            self.site_role.clone(),
            opt(&self.last_login),
        ]
    }
}

impl InventoryRow for GroupItem {
    fn cells(&self) -> Vec<String> {
        vec![self.name.clone(), self.id.clone()]
    }
}

impl InventoryRow for ProjectItem {
    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            opt(&self.description),
            opt(&self.content_permissions),
        ]
    }
}

impl InventoryRow for WorkbookItem {
    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.owner_id.clone(),
            self.project_name.clone(),
            opt(&self.created_at),
            opt(&self.updated_at),
        ]
    }
}

impl InventoryRow for DatasourceItem {
    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.owner_id.clone(),
            self.project_name.clone(),
            opt(&self.created_at),
            opt(&self.updated_at),
        ]
    }
}

/// Render items as an inventory CSV artifact
pub fn render_inventory<T: InventoryRow>(inventory: Inventory, items: &[T]) -> Result<Artifact> {
    let text = write_csv(
        Some(inventory.headers()),
        items.iter().map(InventoryRow::cells),
    )?;
    Ok(Artifact::csv(inventory.file_name(), text))
}

/// List one inventory from a signed-in client and render it
pub fn export_inventory<C: SiteClient + ?Sized>(
    client: &mut C,
    inventory: Inventory,
) -> Result<Artifact> {
    let artifact = match inventory {
        Inventory::Users => render_inventory(inventory, &client.users()?)?,
        Inventory::Groups => render_inventory(inventory, &client.groups()?)?,
        Inventory::Projects => render_inventory(inventory, &client.projects()?)?,
        Inventory::Workbooks => render_inventory(inventory, &client.workbooks()?)?,
        Inventory::Datasources => render_inventory(inventory, &client.datasources()?)?,
    };
    info!(file = %artifact.file_name, bytes = artifact.body.len(), "exported inventory");
    Ok(artifact)
}

/// Export every inventory within one session.
///
/// Any listing failure aborts the export; the session is still closed.
pub fn export_all<C: SiteClient + ?Sized>(
    client: &mut C,
    credentials: &Credentials,
) -> Result<Vec<Artifact>> {
    with_session(client, credentials, |client| -> Result<Vec<Artifact>> {
        Inventory::ALL
            .iter()
            .map(|&inventory| export_inventory(client, inventory))
            .collect()
    })
}
