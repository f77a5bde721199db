//! Expanded result rows
//!
//! An expanded row shows the record's history plus, for concepts, its
//! names, descriptions and mappings. Each section is a sub-list of the
//! record's own API URL (`versions/`, `names/`, ...).

use ocl_common::time::format_date;
use ocl_common::{LocaleRecord, MappingRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::TerminologyApi;
use crate::resources::{scalar_text, ResourceKind, RowTab};

/// One entry of a record's version history
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VersionRow {
    pub id: String,
    pub created_on: String,
    pub created_by: String,
    pub comment: String,
    pub released: bool,
}

/// First non-empty text among `keys`
fn first_text(item: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| scalar_text(item.get(*key)))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

impl VersionRow {
    /// Concept and mapping versions carry `version_created_*`; repository
    /// versions use the plain `created_*` fields.
    pub fn from_item(item: &Value) -> Self {
        Self {
            id: first_text(item, &["version", "id"]),
            created_on: format_date(&first_text(item, &["version_created_on", "created_on"])),
            created_by: first_text(item, &["version_created_by", "created_by"]),
            comment: first_text(item, &["update_comment", "description"]),
            released: item.get("released").and_then(Value::as_bool).unwrap_or(false),
        }
    }
}

/// Contents of an expanded row
#[derive(Debug, Clone, Serialize)]
pub struct RowDetails {
    /// API URL of the expanded record
    pub url: String,
    pub tabs: &'static [RowTab],
    pub versions: Vec<VersionRow>,
    pub names: Vec<LocaleRecord>,
    pub descriptions: Vec<LocaleRecord>,
    pub mappings: Vec<MappingRecord>,
}

/// Items of a list endpoint, skipping any that do not parse.
///
/// Sections the row does not show are not fetched. A section that fails
/// to load is shown empty; the rest of the row still renders.
async fn fetch_items<T: DeserializeOwned>(
    api: &dyn TerminologyApi,
    path: String,
    params: &[(&str, &str)],
    wanted: bool,
) -> Vec<T> {
    if !wanted {
        return Vec::new();
    }
    let items = match api.fetch_json(&path, params).await {
        Ok(Value::Array(items)) => items,
        Ok(_) => Vec::new(),
        Err(err) => {
            tracing::warn!(path = %path, error = %err, "Row section unavailable");
            Vec::new()
        }
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

/// Fetch every section of `url` the resource's rows show, concurrently
pub async fn load_row_details(api: &dyn TerminologyApi, resource: ResourceKind, url: &str) -> RowDetails {
    let tabs = resource.row_tabs();
    let wants = |tab: RowTab| tabs.contains(&tab);
    let base = if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    };

    tracing::debug!(url = %base, resource = resource.key(), "Expanding row");

    let (versions, names, descriptions, mappings) = tokio::join!(
        fetch_items::<Value>(
            api,
            format!("{}versions/", base),
            &[],
            wants(RowTab::History) || wants(RowTab::Versions)
        ),
        fetch_items::<LocaleRecord>(api, format!("{}names/", base), &[], wants(RowTab::Synonyms)),
        fetch_items::<LocaleRecord>(
            api,
            format!("{}descriptions/", base),
            &[],
            wants(RowTab::Descriptions)
        ),
        fetch_items::<MappingRecord>(
            api,
            format!("{}mappings/", base),
            &[("includeInverseMappings", "true")],
            wants(RowTab::Mappings)
        ),
    );

    RowDetails {
        url: url.to_string(),
        tabs,
        versions: versions.iter().map(VersionRow::from_item).collect(),
        names,
        descriptions,
        mappings,
    }
}
