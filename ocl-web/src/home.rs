//! Organization, source and collection home pages
//!
//! Each home page shows the record plus a row of tabs. Listing tabs page
//! through children of the record the same way a search does; a source or
//! collection lists the children of one version, or of HEAD.

use ocl_common::time::format_date;
use ocl_common::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::api::search::{run_listing, SearchParams, SearchResponse};
use crate::client::TerminologyApi;
use crate::details::VersionRow;
use crate::error::ApiResult;
use crate::resources::{scalar_text, ResourceKind};

/// Version name meaning "latest, unversioned"
pub const HEAD: &str = "HEAD";

/// Kind of record a home page shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeKind {
    Organization,
    Source,
    Collection,
}

/// One tab of a home page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Sources,
    Collections,
    Members,
    Details,
    Concepts,
    Mappings,
    References,
    History,
    Versions,
    About,
}

impl Tab {
    const ALL: [Tab; 10] = [
        Tab::Sources,
        Tab::Collections,
        Tab::Members,
        Tab::Details,
        Tab::Concepts,
        Tab::Mappings,
        Tab::References,
        Tab::History,
        Tab::Versions,
        Tab::About,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Tab::Sources => "sources",
            Tab::Collections => "collections",
            Tab::Members => "members",
            Tab::Details => "details",
            Tab::Concepts => "concepts",
            Tab::Mappings => "mappings",
            Tab::References => "references",
            Tab::History => "history",
            Tab::Versions => "versions",
            Tab::About => "about",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Sources => "Sources",
            Tab::Collections => "Collections",
            Tab::Members => "Members",
            Tab::Details => "Details",
            Tab::Concepts => "Concepts",
            Tab::Mappings => "Mappings",
            Tab::References => "References",
            Tab::History => "History",
            Tab::Versions => "Versions",
            Tab::About => "About",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.key() == key)
    }

    /// Resource listed by this tab. Members are users under `members/`.
    pub fn listing(&self) -> Option<ResourceKind> {
        match self {
            Tab::Sources => Some(ResourceKind::Sources),
            Tab::Collections => Some(ResourceKind::Collections),
            Tab::Members => Some(ResourceKind::Users),
            Tab::Concepts => Some(ResourceKind::Concepts),
            Tab::Mappings => Some(ResourceKind::Mappings),
            Tab::References => Some(ResourceKind::References),
            _ => None,
        }
    }
}

impl HomeKind {
    /// Tabs in display order. Organizations and collections only get an
    /// About tab when the record has about text.
    pub fn tabs(&self, has_about: bool) -> Vec<Tab> {
        let mut tabs = match self {
            HomeKind::Organization => vec![Tab::Sources, Tab::Collections, Tab::Members],
            HomeKind::Source => vec![Tab::Details, Tab::Concepts, Tab::Mappings, Tab::History],
            HomeKind::Collection => vec![Tab::Concepts, Tab::Mappings, Tab::References, Tab::Versions],
        };
        if has_about || *self == HomeKind::Source {
            tabs.push(Tab::About);
        }
        tabs
    }

    /// The requested tab, or the first one
    pub fn resolve_tab(&self, requested: Option<&str>, has_about: bool) -> Result<Tab> {
        let tabs = self.tabs(has_about);
        let Some(key) = requested.filter(|k| !k.is_empty()) else {
            return Ok(tabs[0]);
        };
        Tab::from_key(key)
            .filter(|tab| tabs.contains(tab))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown tab: {}", key)))
    }

    pub fn title(&self) -> &'static str {
        match self {
            HomeKind::Organization => "Organization",
            HomeKind::Source => "Source",
            HomeKind::Collection => "Collection",
        }
    }
}

/// A source or collection, optionally pinned to one version, as addressed
/// by its home page path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    pub kind: HomeKind,
    /// `orgs` or `users`
    pub owner_type: String,
    pub owner: String,
    pub repo: String,
    /// `None` means HEAD
    pub version: Option<String>,
}

impl RepoLocation {
    /// Parse `/{orgs|users}/:owner/{sources|collections}/:repo[/:version]`
    pub fn from_path(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let (owner_type, owner, kind, repo, version) = match segments.as_slice() {
            [owner_type, owner, kind, repo] => (*owner_type, *owner, *kind, *repo, None),
            [owner_type, owner, kind, repo, version] => (*owner_type, *owner, *kind, *repo, Some(*version)),
            _ => return None,
        };
        if owner_type != "orgs" && owner_type != "users" {
            return None;
        }
        let kind = match kind {
            "sources" => HomeKind::Source,
            "collections" => HomeKind::Collection,
            _ => return None,
        };

        Some(Self {
            kind,
            owner_type: owner_type.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            version: version.filter(|v| *v != HEAD).map(str::to_string),
        })
    }

    /// API URL of the repository itself, independent of version
    pub fn versioned_object_url(&self) -> String {
        let kind = match self.kind {
            HomeKind::Collection => "collections",
            _ => "sources",
        };
        format!("/{}/{}/{}/{}/", self.owner_type, self.owner, kind, self.repo)
    }

    /// API URL listing `segment` children of the selected version
    pub fn children_url(&self, segment: &str) -> String {
        match &self.version {
            Some(version) => format!("{}{}/{}/", self.versioned_object_url(), version, segment),
            None => format!("{}{}/", self.versioned_object_url(), segment),
        }
    }
}

/// Query parameters of a home page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomeParams {
    pub tab: Option<String>,
    pub q: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub expand_row: Option<String>,
}

impl HomeParams {
    fn listing_params(&self) -> SearchParams {
        SearchParams {
            q: self.q.clone(),
            page: self.page,
            limit: self.limit,
            sort: self.sort.clone(),
            order: self.order.clone(),
            expand_row: self.expand_row.clone(),
        }
    }
}

/// What the active tab shows
#[derive(Debug, Clone)]
pub enum TabContent {
    Listing(SearchResponse),
    /// Label / value pairs of the record
    Details(Vec<(&'static str, String)>),
    Versions(Vec<VersionRow>),
    About(String),
}

/// A fully loaded home page
#[derive(Debug, Clone)]
pub struct HomePage {
    pub kind: HomeKind,
    /// Path of the record's page on this service, HEAD for repositories
    pub home_path: String,
    /// Path of this page, including the selected version
    pub page_path: String,
    pub record: Value,
    /// Selected version; `None` for HEAD and for organizations
    pub version: Option<String>,
    /// Version ids, newest first as the API returns them
    pub versions: Vec<String>,
    pub tabs: Vec<Tab>,
    pub tab: Tab,
    pub content: TabContent,
}

impl HomePage {
    /// Display name of the record
    pub fn name(&self) -> String {
        let name = scalar_text(self.record.get("name"));
        if name.is_empty() {
            scalar_text(self.record.get("id"))
        } else {
            name
        }
    }
}

fn about_text(record: &Value) -> String {
    scalar_text(record.get("extras").and_then(|extras| extras.get("about")))
}

fn details(record: &Value) -> Vec<(&'static str, String)> {
    let text = |key: &str| scalar_text(record.get(key));
    let stamp = |on: &str, by: &str| {
        let on = format_date(&text(on));
        let by = text(by);
        if by.is_empty() {
            on
        } else {
            format!("{} by {}", on, by)
        }
    };
    let locales = match record.get("supported_locales") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| scalar_text(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other),
    };

    vec![
        ("ID", text("id")),
        ("Name", text("name")),
        ("Full Name", text("full_name")),
        ("Type", text("source_type")),
        ("Owner", text("owner")),
        ("Default Locale", text("default_locale")),
        ("Supported Locales", locales),
        ("Custom Validation Schema", text("custom_validation_schema")),
        ("Public Access", text("public_access")),
        ("Website", text("website")),
        ("External ID", text("external_id")),
        ("Description", text("description")),
        ("Created", stamp("created_on", "created_by")),
        ("Updated", stamp("updated_on", "updated_by")),
    ]
}

/// Items of an unpaged list response; anything else is empty
fn items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// GET /orgs/:owner
pub async fn load_organization(api: &dyn TerminologyApi, org: &str, params: &HomeParams) -> ApiResult<HomePage> {
    let url = format!("/orgs/{}/", org);
    let record = api.fetch_json(&url, &[]).await?;
    let about = about_text(&record);
    let kind = HomeKind::Organization;
    let tabs = kind.tabs(!about.is_empty());
    let tab = kind.resolve_tab(params.tab.as_deref(), !about.is_empty())?;

    let content = match tab.listing() {
        Some(resource) => {
            let path = format!("{}{}/", url, tab.key());
            TabContent::Listing(run_listing(api, resource, &path, &params.listing_params()).await?)
        }
        None => TabContent::About(about),
    };

    Ok(HomePage {
        kind,
        home_path: format!("/orgs/{}", org),
        page_path: format!("/orgs/{}", org),
        record,
        version: None,
        versions: Vec::new(),
        tabs,
        tab,
        content,
    })
}

/// GET /{orgs|users}/:owner/{sources|collections}/:repo[/:version]
pub async fn load_repository(
    api: &dyn TerminologyApi,
    location: &RepoLocation,
    params: &HomeParams,
) -> ApiResult<HomePage> {
    let url = location.versioned_object_url();
    let record = api.fetch_json(&url, &[]).await?;
    let versions = items(api.fetch_json(&format!("{}versions/", url), &[("verbose", "true")]).await?);

    let about = about_text(&record);
    let tabs = location.kind.tabs(!about.is_empty());
    let tab = location.kind.resolve_tab(params.tab.as_deref(), !about.is_empty())?;

    let content = match tab {
        Tab::Details => TabContent::Details(details(&record)),
        Tab::History | Tab::Versions => TabContent::Versions(versions.iter().map(VersionRow::from_item).collect()),
        Tab::About => {
            let text = if about.is_empty() {
                scalar_text(record.get("description"))
            } else {
                about
            };
            TabContent::About(text)
        }
        other => match other.listing() {
            Some(resource) => {
                let path = location.children_url(other.key());
                TabContent::Listing(run_listing(api, resource, &path, &params.listing_params()).await?)
            }
            None => TabContent::About(String::new()),
        },
    };

    tracing::debug!(url = %url, tab = tab.key(), version = ?location.version, "Loaded repository home");

    let home_path = url.trim_end_matches('/').to_string();
    let page_path = match &location.version {
        Some(version) => format!("{}/{}", home_path, version),
        None => home_path.clone(),
    };

    Ok(HomePage {
        kind: location.kind,
        home_path,
        page_path,
        record,
        version: location.version.clone(),
        versions: versions
            .iter()
            .map(|v| scalar_text(v.get("id")))
            .filter(|id| !id.is_empty() && id != HEAD)
            .collect(),
        tabs,
        tab,
        content,
    })
}
