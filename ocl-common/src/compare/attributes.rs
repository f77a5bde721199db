//! Compared attributes and their normalized values
//!
//! Each attribute knows its kind and how to pull a display value out of a
//! concept. Equality is always decided on these normalized strings, never
//! on the raw records, so cosmetic differences (field order in JSON, a
//! missing vs `null` field) do not show up as diffs.

use serde::{Serialize, Serializer};

use crate::models::{Concept, Extra, LocaleKind, LocaleRecord, MappingRecord};
use crate::time::format_date;

/// How an attribute is extracted and rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Text,
    FormattedText,
    Bool,
    Date,
    List,
}

/// List-valued attributes; these get a collapsible header row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListAttribute {
    Names,
    Descriptions,
    Extras,
    Mappings,
}

impl ListAttribute {
    pub const ALL: [ListAttribute; 4] = [
        ListAttribute::Names,
        ListAttribute::Descriptions,
        ListAttribute::Extras,
        ListAttribute::Mappings,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ListAttribute::Names => "names",
            ListAttribute::Descriptions => "descriptions",
            ListAttribute::Extras => "extras",
            ListAttribute::Mappings => "mappings",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.key() == key.trim())
    }

    /// Number of records on one side
    pub fn len(&self, concept: &Concept) -> usize {
        match self {
            ListAttribute::Names => concept.names.len(),
            ListAttribute::Descriptions => concept.descriptions.len(),
            ListAttribute::Extras => concept.extras.len(),
            ListAttribute::Mappings => concept.mappings.len(),
        }
    }

    /// Normalized label of every record, in display order
    pub fn labels(&self, concept: &Concept) -> Vec<String> {
        match self {
            ListAttribute::Names => concept.names.iter().map(locale_label).collect(),
            ListAttribute::Descriptions => concept.descriptions.iter().map(locale_label).collect(),
            ListAttribute::Extras => concept.extras.iter().map(extra_label).collect(),
            ListAttribute::Mappings => concept.mappings.iter().map(mapping_label).collect(),
        }
    }
}

impl Serialize for ListAttribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// Every attribute shown in a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Datatype,
    DisplayLocale,
    ExternalId,
    Owner,
    List(ListAttribute),
    Retired,
    CreatedBy,
    UpdatedBy,
    CreatedOn,
    UpdatedOn,
}

impl Attribute {
    /// Display order of the comparison table
    pub const ALL: [Attribute; 13] = [
        Attribute::Datatype,
        Attribute::DisplayLocale,
        Attribute::ExternalId,
        Attribute::Owner,
        Attribute::List(ListAttribute::Names),
        Attribute::List(ListAttribute::Descriptions),
        Attribute::List(ListAttribute::Extras),
        Attribute::List(ListAttribute::Mappings),
        Attribute::Retired,
        Attribute::CreatedBy,
        Attribute::UpdatedBy,
        Attribute::CreatedOn,
        Attribute::UpdatedOn,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Attribute::Datatype => "datatype",
            Attribute::DisplayLocale => "display_locale",
            Attribute::ExternalId => "external_id",
            Attribute::Owner => "owner",
            Attribute::List(list) => list.key(),
            Attribute::Retired => "retired",
            Attribute::CreatedBy => "created_by",
            Attribute::UpdatedBy => "updated_by",
            Attribute::CreatedOn => "created_on",
            Attribute::UpdatedOn => "updated_on",
        }
    }

    /// Human readable row label
    pub fn label(&self) -> &'static str {
        match self {
            Attribute::Datatype => "Datatype",
            Attribute::DisplayLocale => "Display Locale",
            Attribute::ExternalId => "External Id",
            Attribute::Owner => "Owner",
            Attribute::List(ListAttribute::Names) => "Names",
            Attribute::List(ListAttribute::Descriptions) => "Descriptions",
            Attribute::List(ListAttribute::Extras) => "Extras",
            Attribute::List(ListAttribute::Mappings) => "Mappings",
            Attribute::Retired => "Retired",
            Attribute::CreatedBy => "Created By",
            Attribute::UpdatedBy => "Updated By",
            Attribute::CreatedOn => "Created On",
            Attribute::UpdatedOn => "Updated On",
        }
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            Attribute::Datatype
            | Attribute::DisplayLocale
            | Attribute::ExternalId
            | Attribute::CreatedBy
            | Attribute::UpdatedBy => AttributeKind::Text,
            Attribute::Owner => AttributeKind::FormattedText,
            Attribute::List(_) => AttributeKind::List,
            Attribute::Retired => AttributeKind::Bool,
            Attribute::CreatedOn | Attribute::UpdatedOn => AttributeKind::Date,
        }
    }

    /// Normalized value of this attribute for one concept
    pub fn value(&self, concept: &Concept) -> AttributeValue {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let first = |a: &Option<String>, b: &Option<String>| {
            a.as_deref()
                .filter(|s| !s.is_empty())
                .or(b.as_deref())
                .unwrap_or_default()
                .to_string()
        };

        match self {
            Attribute::Datatype => AttributeValue::Scalar(text(&concept.datatype)),
            Attribute::DisplayLocale => AttributeValue::Scalar(text(&concept.display_locale)),
            Attribute::ExternalId => AttributeValue::Scalar(text(&concept.external_id)),
            Attribute::Owner => AttributeValue::Scalar(format!(
                "{}: {}",
                text(&concept.owner_type),
                text(&concept.owner)
            )),
            Attribute::List(list) => AttributeValue::List(list.labels(concept)),
            Attribute::Retired => AttributeValue::Scalar(bool_label(concept.retired).to_string()),
            Attribute::CreatedBy => {
                AttributeValue::Scalar(first(&concept.created_by, &concept.version_created_by))
            }
            Attribute::UpdatedBy => {
                AttributeValue::Scalar(first(&concept.updated_by, &concept.version_updated_by))
            }
            Attribute::CreatedOn => AttributeValue::Scalar(format_date(&first(
                &concept.created_on,
                &concept.created_at,
            ))),
            Attribute::UpdatedOn => AttributeValue::Scalar(format_date(&first(
                &concept.updated_on,
                &concept.updated_at,
            ))),
        }
    }
}

impl Serialize for Attribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// Normalized attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Scalar(String),
    List(Vec<String>),
}

impl AttributeValue {
    /// Display cells, one per rendered row
    pub fn into_cells(self) -> Vec<String> {
        match self {
            AttributeValue::Scalar(value) => vec![value],
            AttributeValue::List(values) => values,
        }
    }
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Multi-line label of a name or description
pub fn locale_label(locale: &LocaleRecord) -> String {
    let text_label = match locale.kind {
        LocaleKind::Name => "Name",
        LocaleKind::Description => "Description",
    };
    [
        format!("Type: {}", locale.type_tag.as_deref().unwrap_or_default()),
        format!("{}: {}", text_label, locale.text),
        format!("Locale: {}", locale.locale),
        format!("Preferred: {}", bool_label(locale.locale_preferred)),
    ]
    .join("\n")
}

/// Multi-line label of a mapping
pub fn mapping_label(mapping: &MappingRecord) -> String {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    [
        format!("UID: {}", mapping.id),
        format!("Relationship: {}", mapping.map_type),
        format!("Source: {} / {}", mapping.owner, mapping.source),
        format!("From Concept Code: {}", opt(&mapping.from_concept_code)),
        format!("From Concept Name: {}", opt(&mapping.from_concept_name)),
        format!("To Concept Code: {}", opt(&mapping.to_concept_code)),
        format!("To Concept Name: {}", opt(&mapping.to_concept_name)),
    ]
    .join("\n")
}

/// `key: <compact JSON>` label of an extra
pub fn extra_label(extra: &Extra) -> String {
    format!("{}: {}", extra.key, extra.value)
}
