//! Resource definitions for result tables
//!
//! Each browsable resource has a fixed set of columns. A column names the
//! JSON attribute it shows and, when sortable, the API field it sorts on.

use ocl_common::time::format_date;
use ocl_common::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// Browsable resource types of the terminology API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Concepts,
    Mappings,
    Sources,
    Collections,
    Organizations,
    Users,
    References,
}

/// Sections shown when a result row is expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowTab {
    Mappings,
    Synonyms,
    Descriptions,
    History,
    Versions,
}

impl RowTab {
    pub fn label(&self) -> &'static str {
        match self {
            RowTab::Mappings => "Mappings",
            RowTab::Synonyms => "Synonyms",
            RowTab::Descriptions => "Descriptions",
            RowTab::History => "History",
            RowTab::Versions => "Versions",
        }
    }
}

/// How a cell value is produced from a result item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    Plain,
    Date,
    /// `from_concept_code` + `from_concept_name`
    FromConcept,
    /// `to_concept_code` + `to_concept_name`
    ToConcept,
}

/// One result table column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub id: &'static str,
    pub label: &'static str,
    /// Dotted path into the result item
    pub value: &'static str,
    /// API sort field; `None` means the column is not sortable
    pub sort_on: Option<&'static str>,
    pub format: ColumnFormat,
}

const fn col(
    id: &'static str,
    label: &'static str,
    value: &'static str,
    sort_on: Option<&'static str>,
    format: ColumnFormat,
) -> Column {
    Column {
        id,
        label,
        value,
        sort_on,
        format,
    }
}

use ColumnFormat::{Date, FromConcept, Plain, ToConcept};

const CONCEPT_COLUMNS: &[Column] = &[
    col("owner", "Owner", "owner", Some("owner"), Plain),
    col("parent", "Source", "source", Some("source"), Plain),
    col("id", "ID", "id", Some("id"), Plain),
    col("name", "Name", "display_name", Some("name"), Plain),
    col("class", "Class", "concept_class", Some("concept_class"), Plain),
    col("datatype", "Datatype", "datatype", Some("datatype"), Plain),
    col("updatedOn", "UpdatedOn", "version_created_on", Some("last_update"), Date),
];

const MAPPING_COLUMNS: &[Column] = &[
    col("owner", "Owner", "owner", Some("owner"), Plain),
    col("parent", "Source", "source", Some("source"), Plain),
    col("id", "ID", "id", Some("id"), Plain),
    col("from", "From Concept", "from_concept_code", None, FromConcept),
    col("mapType", "Type", "map_type", Some("map_type"), Plain),
    col("to", "To Concept", "to_concept_code", None, ToConcept),
    col("updatedOn", "UpdatedOn", "version_created_on", Some("last_update"), Date),
];

const SOURCE_COLUMNS: &[Column] = &[
    col("owner", "Owner", "owner", Some("owner"), Plain),
    col("id", "ID", "short_code", Some("mnemonic"), Plain),
    col("name", "Name", "name", Some("name"), Plain),
    col("sourceType", "Type", "source_type", Some("source_type"), Plain),
];

const COLLECTION_COLUMNS: &[Column] = &[
    col("owner", "Owner", "owner", Some("owner"), Plain),
    col("id", "ID", "short_code", Some("mnemonic"), Plain),
    col("name", "Name", "name", Some("name"), Plain),
    col("collectionType", "Type", "collection_type", Some("collection_type"), Plain),
];

const ORGANIZATION_COLUMNS: &[Column] = &[
    col("id", "ID", "id", Some("mnemonic"), Plain),
    col("name", "Name", "name", Some("name"), Plain),
    col("createdOn", "Created On", "created_on", Some("created_on"), Date),
];

const USER_COLUMNS: &[Column] = &[
    col("username", "Username", "username", Some("username"), Plain),
    col("name", "Name", "name", Some("name"), Plain),
    col("createdOn", "Joined On", "created_on", Some("date_joined"), Date),
];

const REFERENCE_COLUMNS: &[Column] = &[col("expression", "Reference", "expression", None, Plain)];

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Concepts,
        ResourceKind::Mappings,
        ResourceKind::Sources,
        ResourceKind::Collections,
        ResourceKind::Organizations,
        ResourceKind::Users,
        ResourceKind::References,
    ];

    /// Name used in this service's routes
    pub fn key(&self) -> &'static str {
        match self {
            ResourceKind::Concepts => "concepts",
            ResourceKind::Mappings => "mappings",
            ResourceKind::Sources => "sources",
            ResourceKind::Collections => "collections",
            ResourceKind::Organizations => "organizations",
            ResourceKind::Users => "users",
            ResourceKind::References => "references",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// Path segment on the terminology API
    pub fn api_path(&self) -> &'static str {
        match self {
            ResourceKind::Organizations => "orgs",
            other => other.key(),
        }
    }

    /// List endpoint searched for this resource, e.g. `/orgs/`
    pub fn collection_path(&self) -> String {
        format!("/{}/", self.api_path())
    }

    pub fn title(&self) -> &'static str {
        match self {
            ResourceKind::Concepts => "Concepts",
            ResourceKind::Mappings => "Mappings",
            ResourceKind::Sources => "Sources",
            ResourceKind::Collections => "Collections",
            ResourceKind::Organizations => "Organizations",
            ResourceKind::Users => "Users",
            ResourceKind::References => "References",
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        match self {
            ResourceKind::Concepts => CONCEPT_COLUMNS,
            ResourceKind::Mappings => MAPPING_COLUMNS,
            ResourceKind::Sources => SOURCE_COLUMNS,
            ResourceKind::Collections => COLLECTION_COLUMNS,
            ResourceKind::Organizations => ORGANIZATION_COLUMNS,
            ResourceKind::Users => USER_COLUMNS,
            ResourceKind::References => REFERENCE_COLUMNS,
        }
    }

    /// Rows can be picked as the two sides of a comparison
    pub fn is_selectable(&self) -> bool {
        matches!(self, ResourceKind::Concepts)
    }

    /// Sections of an expanded row; empty when rows do not expand
    pub fn row_tabs(&self) -> &'static [RowTab] {
        match self {
            ResourceKind::Concepts => &[
                RowTab::Mappings,
                RowTab::Synonyms,
                RowTab::Descriptions,
                RowTab::History,
            ],
            ResourceKind::Mappings => &[RowTab::History],
            ResourceKind::Sources | ResourceKind::Collections => &[RowTab::Versions],
            _ => &[],
        }
    }

    pub fn is_expandable(&self) -> bool {
        !self.row_tabs().is_empty()
    }

    /// Sort used when the request names none
    pub fn default_sort(&self) -> Option<SortParam> {
        match self {
            ResourceKind::Concepts
            | ResourceKind::Mappings
            | ResourceKind::Sources
            | ResourceKind::Collections => Some(SortParam {
                column_id: "updatedOn",
                field: "last_update",
                order: SortOrder::Desc,
            }),
            _ => None,
        }
    }

    /// Resolve a requested column id and order into an API sort
    pub fn resolve_sort(&self, column_id: Option<&str>, order: Option<&str>) -> Result<Option<SortParam>> {
        let Some(column_id) = column_id.filter(|c| !c.is_empty()) else {
            return Ok(self.default_sort());
        };

        let column = self
            .columns()
            .iter()
            .find(|c| c.id == column_id)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown column: {}", column_id)))?;
        let field = column
            .sort_on
            .ok_or_else(|| Error::InvalidInput(format!("Column is not sortable: {}", column_id)))?;

        Ok(Some(SortParam {
            column_id: column.id,
            field,
            order: SortOrder::parse(order.unwrap_or("desc"))?,
        }))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(Error::InvalidInput(format!("Invalid sort order: {}", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Active sort of a results table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortParam {
    pub column_id: &'static str,
    pub field: &'static str,
    pub order: SortOrder,
}

impl SortParam {
    /// `sortAsc=<field>` or `sortDesc=<field>` for the API query string
    pub fn query_pair(&self) -> (&'static str, &'static str) {
        match self.order {
            SortOrder::Asc => ("sortAsc", self.field),
            SortOrder::Desc => ("sortDesc", self.field),
        }
    }
}

/// Look up a dotted path in a JSON value
fn lookup<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(item, |current, key| current.get(key))
}

pub(crate) fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn concept_ref(item: &Value, code_key: &str, name_key: &str) -> String {
    let code = scalar_text(item.get(code_key));
    let name = scalar_text(item.get(name_key));
    match (code.is_empty(), name.is_empty()) {
        (false, false) => format!("{} {}", code, name),
        (false, true) => code,
        _ => name,
    }
}

impl Column {
    pub fn is_sortable(&self) -> bool {
        self.sort_on.is_some()
    }

    /// Display text of this column for one result item
    pub fn render(&self, item: &Value) -> String {
        match self.format {
            ColumnFormat::Plain => scalar_text(lookup(item, self.value)),
            ColumnFormat::Date => format_date(&scalar_text(lookup(item, self.value))),
            ColumnFormat::FromConcept => concept_ref(item, "from_concept_code", "from_concept_name"),
            ColumnFormat::ToConcept => concept_ref(item, "to_concept_code", "to_concept_name"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_key_and_api_path() {
        assert_eq!(ResourceKind::from_key("organizations"), Some(ResourceKind::Organizations));
        assert_eq!(ResourceKind::Organizations.api_path(), "orgs");
        assert_eq!(ResourceKind::Concepts.api_path(), "concepts");
        assert_eq!(ResourceKind::from_key("orgs"), None);
    }

    #[test]
    fn test_resolve_sort_default() {
        let sort = ResourceKind::Concepts.resolve_sort(None, None).unwrap().unwrap();
        assert_eq!(sort.query_pair(), ("sortDesc", "last_update"));
        assert!(ResourceKind::Users.resolve_sort(None, None).unwrap().is_none());
    }

    #[test]
    fn test_resolve_sort_by_column() {
        let sort = ResourceKind::Sources
            .resolve_sort(Some("id"), Some("ASC"))
            .unwrap()
            .unwrap();
        assert_eq!(sort.query_pair(), ("sortAsc", "mnemonic"));
        assert_eq!(sort.column_id, "id");
    }

    #[test]
    fn test_resolve_sort_rejects_bad_input() {
        assert!(ResourceKind::Mappings.resolve_sort(Some("from"), None).is_err());
        assert!(ResourceKind::Concepts.resolve_sort(Some("nope"), None).is_err());
        assert!(ResourceKind::Concepts.resolve_sort(Some("id"), Some("up")).is_err());
    }

    #[test]
    fn test_column_render() {
        let item = json!({
            "id": 42,
            "display_name": "Malaria",
            "version_created_on": "2021-05-06T07:08:09Z",
            "from_concept_code": "1",
            "from_concept_name": "Fever",
            "to_concept_code": "B54",
            "to_concept_name": null
        });
        let columns = ResourceKind::Mappings.columns();
        let by_id = |id: &str| columns.iter().find(|c| c.id == id).unwrap();

        assert_eq!(by_id("id").render(&item), "42");
        assert_eq!(by_id("from").render(&item), "1 Fever");
        assert_eq!(by_id("to").render(&item), "B54");
        assert_eq!(by_id("updatedOn").render(&item), "05/06/2021");
        assert_eq!(by_id("mapType").render(&item), "");
    }

    #[test]
    fn test_only_concepts_selectable() {
        let selectable: Vec<_> = ResourceKind::ALL
            .into_iter()
            .filter(|k| k.is_selectable())
            .collect();
        assert_eq!(selectable, vec![ResourceKind::Concepts]);
    }

    #[test]
    fn test_row_tabs() {
        assert_eq!(ResourceKind::Concepts.row_tabs().len(), 4);
        assert_eq!(ResourceKind::Mappings.row_tabs(), &[RowTab::History]);
        assert_eq!(ResourceKind::Collections.row_tabs(), &[RowTab::Versions]);
        assert!(!ResourceKind::Organizations.is_expandable());
        assert!(!ResourceKind::References.is_expandable());
        assert_eq!(ResourceKind::Organizations.collection_path(), "/orgs/");
    }
}
