//! State of one comparison view
//!
//! The view owns both concept slots. Each slot moves through
//! `Idle -> Loading -> Loaded | Failed`; fetch completions are applied as
//! discrete transitions tagged with the generation of the request that
//! started them, so a late answer for an older pair of identifiers is
//! dropped instead of overwriting the current comparison.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::align::align_mappings;
use super::attributes::ListAttribute;
use super::diff::{diff_concepts, ComparisonTable};
use super::locale::canonicalize_locales;
use crate::models::Concept;

/// Which half of the comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Lhs,
    Rhs,
}

/// Fetch state of one side
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SideState {
    #[default]
    Idle,
    Loading,
    Loaded(Concept),
    Failed(String),
}

impl SideState {
    pub fn name(&self) -> &'static str {
        match self {
            SideState::Idle => "idle",
            SideState::Loading => "loading",
            SideState::Loaded(_) => "loaded",
            SideState::Failed(_) => "failed",
        }
    }

    pub fn concept(&self) -> Option<&Concept> {
        match self {
            SideState::Loaded(concept) => Some(concept),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SideState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Handed out by [`ComparisonView::request`]; the caller fetches both
/// identifiers and reports back with the same generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub lhs: String,
    pub rhs: String,
}

/// One side-by-side comparison of two concepts
#[derive(Debug, Clone)]
pub struct ComparisonView {
    identifiers: Option<(String, String)>,
    generation: u64,
    lhs: SideState,
    rhs: SideState,
    expanded: BTreeMap<ListAttribute, bool>,
    aligned: bool,
}

impl Default for ComparisonView {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonView {
    /// New view with both sides idle and every list attribute collapsed
    pub fn new() -> Self {
        Self {
            identifiers: None,
            generation: 0,
            lhs: SideState::Idle,
            rhs: SideState::Idle,
            expanded: ListAttribute::ALL.iter().map(|attr| (*attr, false)).collect(),
            aligned: false,
        }
    }

    /// Ask for a comparison of `lhs` and `rhs`.
    ///
    /// Returns a ticket when a fetch is needed: the pair changed, or the
    /// previous attempt for this pair failed. Returns `None` when the pair
    /// is already loaded or in flight. Expand flags survive a new request.
    pub fn request(&mut self, lhs: &str, rhs: &str) -> Option<FetchTicket> {
        let same_pair = self
            .identifiers
            .as_ref()
            .is_some_and(|(l, r)| l == lhs && r == rhs);
        let retry = matches!(self.lhs, SideState::Failed(_) | SideState::Idle)
            || matches!(self.rhs, SideState::Failed(_) | SideState::Idle);
        if same_pair && !retry {
            return None;
        }

        self.generation += 1;
        self.identifiers = Some((lhs.to_string(), rhs.to_string()));
        self.lhs = SideState::Loading;
        self.rhs = SideState::Loading;
        self.aligned = false;

        debug!(generation = self.generation, lhs = %lhs, rhs = %rhs, "Comparison requested");

        Some(FetchTicket {
            generation: self.generation,
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        })
    }

    /// Apply the outcome of one side's fetch.
    ///
    /// Returns `false` when the completion was discarded (older generation,
    /// or the side is no longer loading).
    pub fn complete(&mut self, side: Side, generation: u64, result: Result<Concept, String>) -> bool {
        if generation != self.generation {
            warn!(
                ?side,
                generation,
                current = self.generation,
                "Discarding stale comparison fetch"
            );
            return false;
        }

        let slot = match side {
            Side::Lhs => &mut self.lhs,
            Side::Rhs => &mut self.rhs,
        };
        if *slot != SideState::Loading {
            return false;
        }

        *slot = match result {
            Ok(concept) => SideState::Loaded(prepare(concept)),
            Err(message) => {
                warn!(?side, error = %message, "Comparison fetch failed");
                SideState::Failed(message)
            }
        };

        self.align_if_ready();
        true
    }

    /// Mapping alignment runs once, when the second side arrives
    fn align_if_ready(&mut self) {
        if self.aligned {
            return;
        }
        if let (SideState::Loaded(lhs), SideState::Loaded(rhs)) = (&mut self.lhs, &mut self.rhs) {
            align_mappings(&mut lhs.mappings, &mut rhs.mappings);
            self.aligned = true;
        }
    }

    pub fn state(&self, side: Side) -> &SideState {
        match side {
            Side::Lhs => &self.lhs,
            Side::Rhs => &self.rhs,
        }
    }

    pub fn identifiers(&self) -> Option<(&str, &str)> {
        self.identifiers
            .as_ref()
            .map(|(l, r)| (l.as_str(), r.as_str()))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.lhs == SideState::Loading || self.rhs == SideState::Loading
    }

    /// Sides whose fetch failed, with their messages
    pub fn failures(&self) -> Vec<(Side, &str)> {
        [Side::Lhs, Side::Rhs]
            .into_iter()
            .filter_map(|side| self.state(side).error().map(|e| (side, e)))
            .collect()
    }

    /// Flip the expand flag of one list attribute
    pub fn toggle(&mut self, attr: ListAttribute) {
        let flag = self.expanded.entry(attr).or_insert(false);
        *flag = !*flag;
    }

    /// Raw expand flag, as toggled
    pub fn expand_flag(&self, attr: ListAttribute) -> bool {
        self.expanded.get(&attr).copied().unwrap_or(false)
    }

    /// Whether the rows of a list attribute are shown. A list with no
    /// records on either side has nothing to hide and counts as expanded.
    pub fn is_expanded(&self, attr: ListAttribute) -> bool {
        if self.expand_flag(attr) {
            return true;
        }
        match (self.lhs.concept(), self.rhs.concept()) {
            (Some(lhs), Some(rhs)) => attr.len(lhs) == 0 && attr.len(rhs) == 0,
            _ => false,
        }
    }

    /// Diff table, available once both sides are loaded
    pub fn table(&self) -> Option<ComparisonTable> {
        match (self.lhs.concept(), self.rhs.concept()) {
            (Some(lhs), Some(rhs)) => Some(diff_concepts(lhs, rhs)),
            _ => None,
        }
    }
}

/// Canonical presentation order; content is untouched
fn prepare(mut concept: Concept) -> Concept {
    concept.names = canonicalize_locales(std::mem::take(&mut concept.names));
    concept.descriptions = canonicalize_locales(std::mem::take(&mut concept.descriptions));
    concept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MappingRecord;

    fn concept(id: &str, datatype: &str) -> Concept {
        Concept {
            id: id.to_string(),
            datatype: Some(datatype.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_view_is_idle_and_collapsed() {
        let view = ComparisonView::new();
        assert_eq!(view.state(Side::Lhs), &SideState::Idle);
        assert_eq!(view.state(Side::Rhs), &SideState::Idle);
        for attr in ListAttribute::ALL {
            assert!(!view.expand_flag(attr));
        }
        assert!(view.table().is_none());
    }

    #[test]
    fn test_request_moves_both_sides_to_loading() {
        let mut view = ComparisonView::new();
        let ticket = view.request("/a/", "/b/").unwrap();
        assert_eq!(ticket.generation, 1);
        assert!(view.is_loading());

        // Same pair in flight: nothing new to fetch
        assert!(view.request("/a/", "/b/").is_none());
    }

    #[test]
    fn test_table_only_when_both_loaded() {
        let mut view = ComparisonView::new();
        let ticket = view.request("/a/", "/b/").unwrap();

        assert!(view.complete(Side::Lhs, ticket.generation, Ok(concept("A", "N/A"))));
        assert!(view.table().is_none());
        assert!(view.is_loading());

        assert!(view.complete(Side::Rhs, ticket.generation, Ok(concept("B", "N/A"))));
        assert!(!view.is_loading());
        assert!(view.table().is_some());
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut view = ComparisonView::new();
        let old = view.request("/a/", "/b/").unwrap();
        let new = view.request("/a/", "/c/").unwrap();
        assert_ne!(old.generation, new.generation);

        assert!(!view.complete(Side::Rhs, old.generation, Ok(concept("B", "old"))));
        assert_eq!(view.state(Side::Rhs), &SideState::Loading);

        assert!(view.complete(Side::Rhs, new.generation, Ok(concept("C", "new"))));
        assert_eq!(view.state(Side::Rhs).concept().unwrap().id, "C");
    }

    #[test]
    fn test_failure_is_surfaced_and_retry_allowed() {
        let mut view = ComparisonView::new();
        let ticket = view.request("/a/", "/b/").unwrap();
        view.complete(Side::Lhs, ticket.generation, Err("404 Not Found".to_string()));
        view.complete(Side::Rhs, ticket.generation, Ok(concept("B", "N/A")));

        assert!(!view.is_loading());
        assert_eq!(view.failures(), vec![(Side::Lhs, "404 Not Found")]);
        assert!(view.table().is_none());

        let retry = view.request("/a/", "/b/");
        assert!(retry.is_some());
    }

    #[test]
    fn test_double_completion_ignored() {
        let mut view = ComparisonView::new();
        let ticket = view.request("/a/", "/b/").unwrap();
        assert!(view.complete(Side::Lhs, ticket.generation, Ok(concept("A", "x"))));
        assert!(!view.complete(Side::Lhs, ticket.generation, Ok(concept("Z", "x"))));
        assert_eq!(view.state(Side::Lhs).concept().unwrap().id, "A");
    }

    #[test]
    fn test_mappings_aligned_once_both_loaded() {
        let mapping = |id: &str| MappingRecord {
            id: id.to_string(),
            ..Default::default()
        };
        let mut lhs = concept("A", "x");
        lhs.mappings = vec![mapping("2"), mapping("1")];
        let mut rhs = concept("B", "x");
        rhs.mappings = vec![mapping("1"), mapping("3"), mapping("2")];

        let mut view = ComparisonView::new();
        let ticket = view.request("/a/", "/b/").unwrap();
        view.complete(Side::Rhs, ticket.generation, Ok(rhs));
        view.complete(Side::Lhs, ticket.generation, Ok(lhs));

        let ids: Vec<&str> = view
            .state(Side::Rhs)
            .concept()
            .unwrap()
            .mappings
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[test]
    fn test_toggle_and_empty_lists_count_as_expanded() {
        let mut view = ComparisonView::new();
        let ticket = view.request("/a/", "/b/").unwrap();
        let mut lhs = concept("A", "x");
        lhs.extras = vec![crate::models::Extra {
            key: "k".to_string(),
            value: serde_json::json!(1),
        }];
        view.complete(Side::Lhs, ticket.generation, Ok(lhs));
        view.complete(Side::Rhs, ticket.generation, Ok(concept("B", "x")));

        assert!(view.is_expanded(ListAttribute::Names));
        assert!(!view.is_expanded(ListAttribute::Extras));

        view.toggle(ListAttribute::Extras);
        assert!(view.is_expanded(ListAttribute::Extras));
        view.toggle(ListAttribute::Extras);
        assert!(!view.is_expanded(ListAttribute::Extras));
    }
}
