//! Drive one comparison against the terminology API

use std::collections::BTreeSet;

use ocl_common::compare::{ComparisonView, ListAttribute, Side};
use tracing::info;

use crate::client::TerminologyApi;

/// Parse a comma-separated `expand` parameter into list attributes.
/// Unknown names are ignored.
pub fn parse_expand(raw: Option<&str>) -> BTreeSet<ListAttribute> {
    raw.unwrap_or_default()
        .split(',')
        .filter_map(|name| ListAttribute::from_key(name.trim()))
        .collect()
}

/// Join expanded list attributes back into the query form
pub fn format_expand(expanded: &BTreeSet<ListAttribute>) -> String {
    expanded
        .iter()
        .map(|attr| attr.key())
        .collect::<Vec<_>>()
        .join(",")
}

/// Fetch both concepts concurrently and settle the view.
///
/// Each side ends `Loaded` or `Failed`; a failure on one side never
/// blocks the other.
pub async fn run_comparison(
    api: &dyn TerminologyApi,
    lhs: &str,
    rhs: &str,
    expanded: &BTreeSet<ListAttribute>,
) -> ComparisonView {
    let mut view = ComparisonView::new();
    for attr in expanded {
        view.toggle(*attr);
    }

    let Some(ticket) = view.request(lhs, rhs) else {
        return view;
    };

    let (lhs_result, rhs_result) = tokio::join!(
        api.fetch_concept(&ticket.lhs),
        api.fetch_concept(&ticket.rhs)
    );

    view.complete(Side::Lhs, ticket.generation, lhs_result.map_err(|e| e.to_string()));
    view.complete(Side::Rhs, ticket.generation, rhs_result.map_err(|e| e.to_string()));

    info!(
        lhs = %lhs,
        rhs = %rhs,
        lhs_state = view.state(Side::Lhs).name(),
        rhs_state = view.state(Side::Rhs).name(),
        "Comparison settled"
    );

    view
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expand() {
        let set = parse_expand(Some("names, mappings,bogus,"));
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec![ListAttribute::Names, ListAttribute::Mappings]
        );
        assert!(parse_expand(None).is_empty());
    }

    #[test]
    fn test_format_expand_round_trips_keys() {
        let set = parse_expand(Some("extras,names"));
        assert_eq!(parse_expand(Some(&format_expand(&set))), set);
    }
}
