//! # OCL Common Library
//!
//! Shared code for the OCL admin services including:
//! - Terminology data model (concepts, locale records, mappings, extras)
//! - Concept comparison engine (canonicalization, alignment, diffing)
//! - Configuration loading
//! - Date formatting helpers

pub mod compare;
pub mod config;
pub mod error;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use models::{Concept, Extra, LocaleKind, LocaleRecord, MappingRecord};
