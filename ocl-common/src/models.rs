//! Terminology data model
//!
//! Records as returned by the OCL REST API. The API omits attributes,
//! sends `null`, or sends a value of the wrong type freely, so every field
//! falls back to its empty value instead of failing deserialization.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Type tag marking a fully specified name
pub const FULLY_SPECIFIED: &str = "FULLY_SPECIFIED";

/// Take the field as raw JSON and keep it only if it converts to `T`.
/// `null`, wrong types and malformed values all become `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Like [`lenient`] for lists, but a malformed element is skipped
/// without discarding its well-formed siblings.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// A concept, or a concept version
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Concept {
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub uuid: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub url: String,
    #[serde(deserialize_with = "lenient")]
    pub display_name: String,
    #[serde(deserialize_with = "lenient")]
    pub display_locale: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub source: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub owner: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub owner_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub concept_class: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub datatype: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub external_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub retired: bool,
    #[serde(deserialize_with = "lenient")]
    pub created_by: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub updated_by: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub version_created_by: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub version_updated_by: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub created_on: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub updated_on: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub updated_at: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub names: Vec<LocaleRecord>,
    #[serde(deserialize_with = "lenient_list")]
    pub descriptions: Vec<LocaleRecord>,
    #[serde(deserialize_with = "lenient_list")]
    pub mappings: Vec<MappingRecord>,
    #[serde(deserialize_with = "extras_from_map")]
    pub extras: Vec<Extra>,
}

impl Concept {
    /// URL of the parent repository (source or collection) this concept
    /// lives in, derived from its own URL.
    ///
    /// `/orgs/CIEL/sources/CIEL/concepts/123/` -> `/orgs/CIEL/sources/CIEL/`
    pub fn parent_url(&self) -> String {
        let segments: Vec<&str> = self.url.split('/').filter(|s| !s.is_empty()).collect();
        match segments.iter().position(|s| *s == "concepts") {
            Some(idx) => format!("/{}/", segments[..idx].join("/")),
            None => self.url.clone(),
        }
    }
}

/// Whether a locale record is a name or a description
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleKind {
    #[default]
    Name,
    Description,
}

/// A localized name or description attached to a concept
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocaleRecord {
    pub uuid: Option<String>,
    pub kind: LocaleKind,
    pub text: String,
    /// `name_type` or `description_type`
    pub type_tag: Option<String>,
    pub locale: String,
    pub locale_preferred: bool,
    pub external_id: Option<String>,
}

impl LocaleRecord {
    pub fn is_fully_specified(&self) -> bool {
        self.type_tag.as_deref() == Some(FULLY_SPECIFIED)
    }
}

/// Wire shape shared by names and descriptions
#[derive(Deserialize)]
struct RawLocale {
    #[serde(default, deserialize_with = "lenient")]
    uuid: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    name_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    description_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    locale: String,
    #[serde(default, deserialize_with = "lenient")]
    locale_preferred: bool,
    #[serde(default, deserialize_with = "lenient")]
    external_id: Option<String>,
}

impl<'de> Deserialize<'de> for LocaleRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawLocale::deserialize(deserializer)?;
        let (kind, text) = match (raw.name, raw.description) {
            (Some(name), _) => (LocaleKind::Name, name),
            (None, Some(description)) => (LocaleKind::Description, description),
            (None, None) => (LocaleKind::Name, String::new()),
        };
        let type_tag = raw
            .name_type
            .filter(|t| !t.is_empty())
            .or(raw.description_type.filter(|t| !t.is_empty()));

        Ok(LocaleRecord {
            uuid: raw.uuid,
            kind,
            text,
            type_tag,
            locale: raw.locale,
            locale_preferred: raw.locale_preferred,
            external_id: raw.external_id,
        })
    }
}

/// A directed relationship between two concepts
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MappingRecord {
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub uuid: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub map_type: String,
    #[serde(deserialize_with = "lenient")]
    pub owner: String,
    #[serde(deserialize_with = "lenient")]
    pub source: String,
    #[serde(deserialize_with = "lenient")]
    pub from_concept_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub from_concept_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub to_concept_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub to_concept_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
}

/// One custom attribute of a concept
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extra {
    pub key: String,
    pub value: Value,
}

/// `extras` is a JSON object on the wire; keep one record per key.
/// Anything other than an object yields no extras.
fn extras_from_map<'de, D>(deserializer: D) -> Result<Vec<Extra>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => return Ok(Vec::new()),
    };
    Ok(map
        .into_iter()
        .map(|(key, value)| Extra { key, value })
        .collect())
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_concept_tolerates_nulls_and_missing_fields() {
        let concept: Concept = serde_json::from_value(json!({
            "id": "123",
            "descriptions": null,
            "extras": null,
            "retired": null,
            "datatype": null
        }))
        .unwrap();

        assert_eq!(concept.id, "123");
        assert!(concept.descriptions.is_empty());
        assert!(concept.names.is_empty());
        assert!(concept.extras.is_empty());
        assert!(!concept.retired);
        assert!(concept.datatype.is_none());
    }

    #[test]
    fn test_wrong_typed_fields_fall_back_to_empty() {
        let concept: Concept = serde_json::from_value(json!({
            "id": "123",
            "extras": [],
            "retired": "false",
            "datatype": 5,
            "names": [
                {"name": "Malaria", "locale": "en", "locale_preferred": "yes"},
                "not a name"
            ],
            "mappings": {"id": "M1"}
        }))
        .unwrap();

        assert_eq!(concept.id, "123");
        assert!(concept.extras.is_empty());
        assert!(!concept.retired);
        assert!(concept.datatype.is_none());
        assert_eq!(concept.names.len(), 1);
        assert_eq!(concept.names[0].text, "Malaria");
        assert!(!concept.names[0].locale_preferred);
        assert!(concept.mappings.is_empty());
    }

    #[test]
    fn test_locale_kind_from_text_key() {
        let name: LocaleRecord = serde_json::from_value(json!({
            "name": "Malaria",
            "name_type": "FULLY_SPECIFIED",
            "locale": "en",
            "locale_preferred": true
        }))
        .unwrap();
        assert_eq!(name.kind, LocaleKind::Name);
        assert_eq!(name.text, "Malaria");
        assert!(name.is_fully_specified());

        let description: LocaleRecord = serde_json::from_value(json!({
            "description": "A disease",
            "description_type": "Definition",
            "locale": "en"
        }))
        .unwrap();
        assert_eq!(description.kind, LocaleKind::Description);
        assert_eq!(description.type_tag.as_deref(), Some("Definition"));
        assert!(!description.locale_preferred);
    }

    #[test]
    fn test_extras_become_records() {
        let concept: Concept = serde_json::from_value(json!({
            "extras": {"is_set": false, "hi_absolute": 10}
        }))
        .unwrap();
        assert_eq!(concept.extras.len(), 2);
        assert!(concept
            .extras
            .iter()
            .any(|e| e.key == "hi_absolute" && e.value == json!(10)));
    }

    #[test]
    fn test_parent_url() {
        let concept = Concept {
            url: "/orgs/CIEL/sources/CIEL/concepts/123/".to_string(),
            ..Default::default()
        };
        assert_eq!(concept.parent_url(), "/orgs/CIEL/sources/CIEL/");

        let version = Concept {
            url: "/users/admin/sources/S1/concepts/A/1234/".to_string(),
            ..Default::default()
        };
        assert_eq!(version.parent_url(), "/users/admin/sources/S1/");
    }
}
