//! Row-level attribute differ

use serde::Serialize;

use super::attributes::{Attribute, AttributeKind, ListAttribute};
use crate::models::Concept;

/// Identifying details shown above each side of the comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptHeader {
    pub id: String,
    pub display_name: String,
    pub url: String,
    pub parent_url: String,
    pub source: String,
    pub concept_class: String,
}

impl From<&Concept> for ConceptHeader {
    fn from(concept: &Concept) -> Self {
        Self {
            id: concept.id.clone(),
            display_name: concept.display_name.clone(),
            url: concept.url.clone(),
            parent_url: concept.parent_url(),
            source: concept.source.clone().unwrap_or_default(),
            concept_class: concept.concept_class.clone().unwrap_or_default(),
        }
    }
}

/// One rendered row; missing list positions are empty strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRow {
    pub lhs: String,
    pub rhs: String,
    pub is_diff: bool,
}

impl DiffRow {
    fn new(lhs: String, rhs: String) -> Self {
        let is_diff = lhs != rhs;
        Self { lhs, rhs, is_diff }
    }
}

/// Diff result for one attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeDiff {
    pub attribute: Attribute,
    pub label: &'static str,
    pub kind: AttributeKind,
    /// Whole-attribute inequality, decided on normalized values
    pub is_diff: bool,
    /// Record counts per side; only set for list attributes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lhs_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rhs_count: Option<usize>,
    pub rows: Vec<DiffRow>,
}

impl AttributeDiff {
    pub fn list_attribute(&self) -> Option<ListAttribute> {
        match self.attribute {
            Attribute::List(list) => Some(list),
            _ => None,
        }
    }
}

/// Complete side-by-side comparison of two concepts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub lhs: ConceptHeader,
    pub rhs: ConceptHeader,
    pub attributes: Vec<AttributeDiff>,
}

impl ComparisonTable {
    /// Attributes whose values differ between the two sides
    pub fn diffing_attributes(&self) -> Vec<Attribute> {
        self.attributes
            .iter()
            .filter(|diff| diff.is_diff)
            .map(|diff| diff.attribute)
            .collect()
    }

    pub fn attribute(&self, attribute: Attribute) -> Option<&AttributeDiff> {
        self.attributes.iter().find(|diff| diff.attribute == attribute)
    }
}

/// Diff a single attribute between two concepts
pub fn diff_attribute(attribute: Attribute, lhs: &Concept, rhs: &Concept) -> AttributeDiff {
    let lhs_value = attribute.value(lhs);
    let rhs_value = attribute.value(rhs);
    let is_diff = lhs_value != rhs_value;

    let counts = match attribute {
        Attribute::List(list) => Some((list.len(lhs), list.len(rhs))),
        _ => None,
    };

    // A scalar is a single cell; lists are padded to the longer side
    let lhs_cells = lhs_value.into_cells();
    let rhs_cells = rhs_value.into_cells();
    let row_count = lhs_cells.len().max(rhs_cells.len());
    let mut lhs_iter = lhs_cells.into_iter();
    let mut rhs_iter = rhs_cells.into_iter();
    let rows = (0..row_count)
        .map(|_| {
            DiffRow::new(
                lhs_iter.next().unwrap_or_default(),
                rhs_iter.next().unwrap_or_default(),
            )
        })
        .collect();

    AttributeDiff {
        attribute,
        label: attribute.label(),
        kind: attribute.kind(),
        is_diff,
        lhs_count: counts.map(|c| c.0),
        rhs_count: counts.map(|c| c.1),
        rows,
    }
}

/// Diff every compared attribute, in display order
pub fn diff_concepts(lhs: &Concept, rhs: &Concept) -> ComparisonTable {
    ComparisonTable {
        lhs: ConceptHeader::from(lhs),
        rhs: ConceptHeader::from(rhs),
        attributes: Attribute::ALL
            .iter()
            .map(|attribute| diff_attribute(*attribute, lhs, rhs))
            .collect(),
    }
}
