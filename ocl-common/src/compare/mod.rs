//! Concept comparison engine
//!
//! Two independently fetched concepts are put side by side:
//! - `locale`: canonical ordering of names/descriptions
//! - `align`: reorder mappings so shared ids line up
//! - `attributes`: per-attribute value extraction and labels
//! - `diff`: row-level equality flags for rendering
//! - `view`: per-side fetch state and expand flags for one comparison

pub mod align;
pub mod attributes;
pub mod diff;
pub mod locale;
pub mod view;

pub use align::align_mappings;
pub use attributes::{Attribute, AttributeKind, AttributeValue, ListAttribute};
pub use diff::{diff_concepts, AttributeDiff, ComparisonTable, ConceptHeader, DiffRow};
pub use locale::canonicalize_locales;
pub use view::{ComparisonView, FetchTicket, Side, SideState};
