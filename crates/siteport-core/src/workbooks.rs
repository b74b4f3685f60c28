//! Workbook download and upload.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::artifact::Artifact;
use crate::error::{CoreError, Result};
use crate::import::ItemFailure;
use crate::site::{with_session, Credentials, SiteClient, WorkbookItem};

/// File extensions accepted for publishing
pub const WORKBOOK_EXTENSIONS: &[&str] = &["twbx", "twb"];

/// Workbooks belonging to the named project
pub fn workbooks_in_project<'a>(workbooks: &'a [WorkbookItem], project: &str) -> Vec<&'a WorkbookItem> {
    workbooks
        .iter()
        .filter(|wb| wb.project_name == project)
        .collect()
}

/// Download file name for a workbook
pub fn workbook_file_name(name: &str) -> String {
    format!("{}.twbx", name)
}

/// Workbook name to publish an uploaded file under: the file name without
/// its last extension
pub fn publish_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
}

/// Downloaded workbooks plus the ones that failed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    pub artifacts: Vec<Artifact>,
    pub failed: Vec<ItemFailure>,
}

/// Download every workbook in a project.
///
/// Listing failures abort; a failed download is recorded and the rest
/// continue. A project without workbooks yields an empty report.
pub fn download_project_workbooks<C: SiteClient + ?Sized>(
    client: &mut C,
    credentials: &Credentials,
    project: &str,
) -> Result<DownloadReport> {
    with_session(client, credentials, |client| -> Result<DownloadReport> {
        let workbooks = client.workbooks()?;
        let selected = workbooks_in_project(&workbooks, project);

        let mut report = DownloadReport::default();
        if selected.is_empty() {
            warn!(project, "no workbooks found in project");
            return Ok(report);
        }
        info!(project, count = selected.len(), "downloading workbooks");

        for wb in selected {
            match client.download_workbook(&wb.id) {
                Ok(bytes) => report
                    .artifacts
                    .push(Artifact::binary(workbook_file_name(&wb.name), bytes)),
                Err(e) => {
                    warn!(workbook = %wb.name, error = %e, "download failed");
                    report.failed.push(ItemFailure {
                        name: wb.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    })
}

/// Download one workbook by project and name
pub fn download_workbook<C: SiteClient + ?Sized>(
    client: &mut C,
    credentials: &Credentials,
    project: &str,
    name: &str,
) -> Result<Artifact> {
    with_session(client, credentials, |client| -> Result<Artifact> {
        let workbooks = client.workbooks()?;
        let wb = workbooks_in_project(&workbooks, project)
            .into_iter()
            .find(|wb| wb.name == name)
            .ok_or_else(|| CoreError::WorkbookNotFound {
                project: project.to_string(),
                name: name.to_string(),
            })?;

        let bytes = client.download_workbook(&wb.id)?;
        info!(workbook = name, bytes = bytes.len(), "downloaded workbook");
        Ok(Artifact::binary(workbook_file_name(&wb.name), bytes))
    })
}

/// Workbooks in a project whose name contains `query`, ignoring case.
///
/// A blank query matches every workbook in the project.
pub fn search_workbooks<'a>(
    workbooks: &'a [WorkbookItem],
    project: &str,
    query: &str,
) -> Vec<&'a WorkbookItem> {
    let query = query.trim().to_lowercase();
    workbooks_in_project(workbooks, project)
        .into_iter()
        .filter(|wb| wb.name.to_lowercase().contains(&query))
        .collect()
}

/// Download a selection of workbooks by id.
///
/// Ids the site no longer lists and failed downloads are recorded; the rest
/// continue.
pub fn download_workbooks<C: SiteClient + ?Sized>(
    client: &mut C,
    credentials: &Credentials,
    ids: &[String],
) -> Result<DownloadReport> {
    with_session(client, credentials, |client| -> Result<DownloadReport> {
        let workbooks = client.workbooks()?;
        let mut report = DownloadReport::default();

        for id in ids {
            let Some(wb) = workbooks.iter().find(|wb| &wb.id == id) else {
                warn!(workbook_id = %id, "selected workbook not found");
                report.failed.push(ItemFailure {
                    name: id.clone(),
                    error: "workbook not found".to_string(),
                });
                continue;
            };

            match client.download_workbook(&wb.id) {
                Ok(bytes) => report
                    .artifacts
                    .push(Artifact::binary(workbook_file_name(&wb.name), bytes)),
                Err(e) => {
                    warn!(workbook = %wb.name, error = %e, "download failed");
                    report.failed.push(ItemFailure {
                        name: wb.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            downloaded = report.artifacts.len(),
            failed = report.failed.len(),
            "selected workbooks downloaded"
        );
        Ok(report)
    })
}

/// Where uploaded workbooks go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// An existing project, by name
    Existing(String),
    /// A project created for this upload
    New(String),
}

/// A workbook file supplied by the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Published workbooks plus the files that failed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub published: Vec<WorkbookItem>,
    pub failed: Vec<ItemFailure>,
}

fn has_workbook_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| WORKBOOK_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Publish workbook files into a project, overwriting same-named workbooks.
///
/// Resolving or creating the project must succeed; each file is then
/// published independently.
pub fn upload_workbooks<C: SiteClient + ?Sized>(
    client: &mut C,
    credentials: &Credentials,
    target: &UploadTarget,
    files: &[WorkbookFile],
) -> Result<UploadReport> {
    if let UploadTarget::New(name) = target {
        if name.trim().is_empty() {
            return Err(CoreError::EmptyProjectName);
        }
    }

    with_session(client, credentials, |client| -> Result<UploadReport> {
        let project_id = match target {
            UploadTarget::Existing(name) => client
                .projects()?
                .into_iter()
                .find(|p| &p.name == name)
                .map(|p| p.id)
                .ok_or_else(|| CoreError::ProjectNotFound(name.clone()))?,
            UploadTarget::New(name) => {
                let project = client.create_project(name.trim())?;
                info!(project = %project.name, "created project");
                project.id
            }
        };

        let mut report = UploadReport::default();
        for file in files {
            if !has_workbook_extension(&file.file_name) {
                report.failed.push(ItemFailure {
                    name: file.file_name.clone(),
                    error: "not a .twb or .twbx file".to_string(),
                });
                continue;
            }

            let name = publish_name(&file.file_name);
            match client.publish_workbook(&project_id, &name, &file.file_name, &file.content) {
                Ok(wb) => {
                    info!(file = %file.file_name, "uploaded workbook");
                    report.published.push(wb);
                }
                Err(e) => {
                    warn!(file = %file.file_name, error = %e, "upload failed");
                    report.failed.push(ItemFailure {
                        name: file.file_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_name_strips_last_extension() {
        assert_eq!(publish_name("Sales.twbx"), "Sales");
        assert_eq!(publish_name("Q1.Sales.twb"), "Q1.Sales");
        assert_eq!(publish_name("README"), "README");
    }

    #[test]
    fn test_workbook_file_name() {
        assert_eq!(workbook_file_name("Sales Overview"), "Sales Overview.twbx");
    }

    #[test]
    fn test_has_workbook_extension() {
        assert!(has_workbook_extension("a.twbx"));
        assert!(has_workbook_extension("a.TWB"));
        assert!(!has_workbook_extension("a.xlsx"));
        assert!(!has_workbook_extension("twbx"));
    }

    #[test]
    fn test_workbooks_in_project() {
        let workbooks = vec![
            WorkbookItem {
                id: "1".to_string(),
                name: "A".to_string(),
                project_name: "Finance".to_string(),
                ..Default::default()
            },
            WorkbookItem {
                id: "2".to_string(),
                name: "B".to_string(),
                project_name: "Sales".to_string(),
                ..Default::default()
            },
        ];
        let selected = workbooks_in_project(&workbooks, "Sales");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "2");
        assert!(workbooks_in_project(&workbooks, "finance").is_empty());
    }

    #[test]
    fn test_search_workbooks_ignores_case() {
        let workbooks: Vec<WorkbookItem> = [
            ("1", "Quarterly Sales", "Sales"),
            ("2", "sales pipeline", "Sales"),
            ("3", "Hiring", "Sales"),
            ("4", "Sales Budget", "Finance"),
        ]
        .iter()
        .map(|(id, name, project)| WorkbookItem {
            id: id.to_string(),
            name: name.to_string(),
            project_name: project.to_string(),
            ..Default::default()
        })
        .collect();

        let ids = |found: Vec<&WorkbookItem>| -> Vec<String> {
            found.into_iter().map(|wb| wb.id.clone()).collect()
        };
        assert_eq!(ids(search_workbooks(&workbooks, "Sales", "SALES")), vec!["1", "2"]);
        assert_eq!(ids(search_workbooks(&workbooks, "Sales", "  ")), vec!["1", "2", "3"]);
        assert!(search_workbooks(&workbooks, "Sales", "budget").is_empty());
    }
}
