//! Site collaborator contract.
//!
//! siteport does not speak the Tableau REST protocol itself. Everything that
//! needs a live site goes through [`SiteClient`], which an embedding
//! application implements on top of its Tableau client of choice.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AuthMethod, ConnectionSettings};

/// Errors reported by a [`SiteClient`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiteError {
    /// Sign-in was rejected
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The requested object does not exist on the site
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other request failure
    #[error("{0}")]
    Request(String),
}

/// Sign-in credentials for a site
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Personal access token
    PersonalAccessToken {
        /// Token name
        name: String,
        /// Token secret
        secret: String,
        /// Site content URL; empty for the default site
        site: String,
    },
    /// Username and password
    Password {
        /// Username
        username: String,
        /// Password
        password: String,
        /// Site content URL; empty for the default site
        site: String,
    },
}

impl Credentials {
    /// Build credentials for the configured auth method
    pub fn from_settings(
        settings: &ConnectionSettings,
        identity: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        let site = settings.site_content_url.clone();
        match settings.auth {
            AuthMethod::Pat => Credentials::PersonalAccessToken {
                name: identity.into(),
                secret: secret.into(),
                site,
            },
            AuthMethod::Password => Credentials::Password {
                username: identity.into(),
                password: secret.into(),
                site,
            },
        }
    }

    /// Site content URL these credentials target
    pub fn site(&self) -> &str {
        match self {
            Credentials::PersonalAccessToken { site, .. } | Credentials::Password { site, .. } => {
                site
            }
        }
    }

    /// Token name or username
    pub fn identity(&self) -> &str {
        match self {
            Credentials::PersonalAccessToken { name, .. } => name,
            Credentials::Password { username, .. } => username,
        }
    }
}

// Secrets never reach logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::PersonalAccessToken { name, site, .. } => f
                .debug_struct("PersonalAccessToken")
                .field("name", name)
                .field("secret", &"***")
                .field("site", site)
                .finish(),
            Credentials::Password { username, site, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"***")
                .field("site", site)
                .finish(),
        }
    }
}

/// A site user as listed by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserItem {
    pub name: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub site_role: String,
    pub last_login: Option<String>,
}

/// A site group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupItem {
    pub id: String,
    pub name: String,
}

/// A project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub content_permissions: Option<String>,
}

/// A published workbook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkbookItem {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub project_name: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// A published datasource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasourceItem {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub project_name: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// A user to be added to the site.
///
/// Optional attributes are passed through as read from the import file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub name: String,
    pub site_role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_setting: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_auth_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_never_expires: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_change_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_admin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

/// Operations siteport needs from a Tableau site.
///
/// Implementations own the session; calls other than `sign_in` are only
/// made between a successful `sign_in` and the matching `sign_out`.
pub trait SiteClient {
    /// Open a session
    fn sign_in(&mut self, credentials: &Credentials) -> Result<(), SiteError>;

    /// Close the session
    fn sign_out(&mut self) -> Result<(), SiteError>;

    fn users(&mut self) -> Result<Vec<UserItem>, SiteError>;

    fn groups(&mut self) -> Result<Vec<GroupItem>, SiteError>;

    fn projects(&mut self) -> Result<Vec<ProjectItem>, SiteError>;

    fn workbooks(&mut self) -> Result<Vec<WorkbookItem>, SiteError>;

    fn datasources(&mut self) -> Result<Vec<DatasourceItem>, SiteError>;

    fn add_user(&mut self, user: &NewUser) -> Result<(), SiteError>;

    fn create_group(&mut self, name: &str) -> Result<(), SiteError>;

    /// Create a project and return it
    fn create_project(&mut self, name: &str) -> Result<ProjectItem, SiteError>;

    /// Fetch the packaged workbook file
    fn download_workbook(&mut self, workbook_id: &str) -> Result<Vec<u8>, SiteError>;

    /// Publish a workbook into a project, overwriting any workbook of the same name
    fn publish_workbook(
        &mut self,
        project_id: &str,
        name: &str,
        file_name: &str,
        content: &[u8],
    ) -> Result<WorkbookItem, SiteError>;
}

/// Run `f` inside a signed-in session.
///
/// The session is signed out whether or not `f` succeeds; a failed sign-out
/// is logged and does not mask the result of `f`.
pub fn with_session<C, T, E>(
    client: &mut C,
    credentials: &Credentials,
    f: impl FnOnce(&mut C) -> Result<T, E>,
) -> Result<T, E>
where
    C: SiteClient + ?Sized,
    E: From<SiteError>,
{
    client.sign_in(credentials)?;
    info!(site = credentials.site(), user = credentials.identity(), "signed in");

    let result = f(client);

    match client.sign_out() {
        Ok(()) => info!("signed out"),
        Err(e) => warn!(error = %e, "sign-out failed"),
    }
    result
}
