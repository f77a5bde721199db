//! Mapping alignment
//!
//! Two versions of a concept usually share most of their mappings. Putting
//! shared mappings on the same rows keeps the side-by-side view quiet.

use std::collections::HashSet;

use crate::models::MappingRecord;

/// Reorder `target` so records whose id occurs in `reference` come first,
/// in `reference` order, followed by the rest in their original order.
///
/// Records with an id are deduplicated by id (first occurrence wins).
/// Records without an id never match and are kept as they are. Every
/// record in the output comes from `target`; `reference` only supplies
/// order.
pub fn align_against(reference: &[MappingRecord], target: Vec<MappingRecord>) -> Vec<MappingRecord> {
    let mut remaining: Vec<Option<MappingRecord>> = target.into_iter().map(Some).collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut aligned = Vec::with_capacity(remaining.len());

    for wanted in reference {
        if wanted.id.is_empty() || seen.contains(&wanted.id) {
            continue;
        }
        let position = remaining
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|m| m.id == wanted.id));
        if let Some(mapping) = position.and_then(|pos| remaining[pos].take()) {
            seen.insert(mapping.id.clone());
            aligned.push(mapping);
        }
    }

    for mapping in remaining.into_iter().flatten() {
        if mapping.id.is_empty() || seen.insert(mapping.id.clone()) {
            aligned.push(mapping);
        }
    }

    aligned
}

/// Align the longer mapping list against the shorter one, in place.
///
/// On equal lengths the right-hand side is reordered. Does nothing when
/// either side is empty. Returns `true` when a reorder pass ran.
pub fn align_mappings(lhs: &mut Vec<MappingRecord>, rhs: &mut Vec<MappingRecord>) -> bool {
    if lhs.is_empty() || rhs.is_empty() {
        return false;
    }

    if lhs.len() > rhs.len() {
        let target = std::mem::take(lhs);
        *lhs = align_against(rhs, target);
    } else {
        let target = std::mem::take(rhs);
        *rhs = align_against(lhs, target);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(id: &str, map_type: &str) -> MappingRecord {
        MappingRecord {
            id: id.to_string(),
            map_type: map_type.to_string(),
            ..Default::default()
        }
    }

    fn ids(mappings: &[MappingRecord]) -> Vec<&str> {
        mappings.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_longer_side_follows_shorter_order() {
        let mut lhs = vec![mapping("3", "SAME-AS"), mapping("1", "SAME-AS")];
        let mut rhs = vec![
            mapping("1", "SAME-AS"),
            mapping("2", "NARROWER-THAN"),
            mapping("3", "SAME-AS"),
        ];

        assert!(align_mappings(&mut lhs, &mut rhs));
        assert_eq!(ids(&lhs), vec!["3", "1"]);
        assert_eq!(ids(&rhs), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_left_side_reordered_when_longer() {
        let mut lhs = vec![mapping("a", "X"), mapping("b", "X"), mapping("c", "X")];
        let mut rhs = vec![mapping("c", "Y")];

        align_mappings(&mut lhs, &mut rhs);
        assert_eq!(ids(&lhs), vec!["c", "a", "b"]);
        // Content stays with its own side
        assert_eq!(lhs[0].map_type, "X");
        assert_eq!(ids(&rhs), vec!["c"]);
    }

    #[test]
    fn test_equal_length_reorders_rhs() {
        let mut lhs = vec![mapping("a", "X"), mapping("b", "X")];
        let mut rhs = vec![mapping("b", "X"), mapping("a", "X")];

        align_mappings(&mut lhs, &mut rhs);
        assert_eq!(ids(&lhs), vec!["a", "b"]);
        assert_eq!(ids(&rhs), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_side_short_circuits() {
        let mut lhs = Vec::new();
        let mut rhs = vec![mapping("b", "X"), mapping("a", "X")];

        assert!(!align_mappings(&mut lhs, &mut rhs));
        assert_eq!(ids(&rhs), vec!["b", "a"]);
    }

    #[test]
    fn test_unmatched_reference_ids_are_not_inserted() {
        let reference = vec![mapping("zzz", "X"), mapping("b", "X")];
        let target = vec![mapping("a", "X"), mapping("b", "X"), mapping("c", "X")];

        let aligned = align_against(&reference, target);
        assert_eq!(ids(&aligned), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_duplicate_ids_are_dropped() {
        let reference = vec![mapping("a", "X")];
        let target = vec![mapping("b", "X"), mapping("a", "1"), mapping("a", "2")];

        let aligned = align_against(&reference, target);
        assert_eq!(ids(&aligned), vec!["a", "b"]);
        assert_eq!(aligned[0].map_type, "1");
    }

    #[test]
    fn test_records_without_id_are_never_merged() {
        let reference = vec![mapping("", "A"), mapping("b", "X")];
        let target = vec![mapping("", "A"), mapping("b", "X"), mapping("", "B"), mapping("", "C")];

        let aligned = align_against(&reference, target);
        let types: Vec<&str> = aligned.iter().map(|m| m.map_type.as_str()).collect();
        assert_eq!(types, vec!["X", "A", "B", "C"]);
    }
}
