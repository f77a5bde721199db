//! Plain-text comparison output for the command line

use std::fmt::Write;

use ocl_common::compare::{ComparisonView, Side};

/// Multi-line record labels joined for a single output line
fn one_line(label: &str) -> String {
    label.replace('\n', "; ")
}

/// Render a settled comparison. Differing rows are marked with `*`;
/// collapsed lists show their record counts only.
pub fn render_comparison(view: &ComparisonView, only_diffs: bool) -> String {
    let mut out = String::new();

    for (side, message) in view.failures() {
        let which = match side {
            Side::Lhs => "lhs",
            Side::Rhs => "rhs",
        };
        let _ = writeln!(out, "error: {} could not be loaded: {}", which, message);
    }

    let Some(table) = view.table() else {
        return out;
    };

    let _ = writeln!(out, "lhs: {} ({})", table.lhs.display_name, table.lhs.url);
    let _ = writeln!(out, "rhs: {} ({})", table.rhs.display_name, table.rhs.url);

    for diff in &table.attributes {
        if only_diffs && !diff.is_diff {
            continue;
        }
        let marker = if diff.is_diff { '*' } else { ' ' };

        match diff.list_attribute() {
            Some(list) => {
                let _ = writeln!(
                    out,
                    "{} {} [{} | {}]",
                    marker,
                    diff.label,
                    diff.lhs_count.unwrap_or_default(),
                    diff.rhs_count.unwrap_or_default()
                );
                if view.is_expanded(list) {
                    for row in diff.rows.iter().filter(|row| !only_diffs || row.is_diff) {
                        let row_marker = if row.is_diff { '*' } else { ' ' };
                        let _ = writeln!(
                            out,
                            "    {} {} | {}",
                            row_marker,
                            one_line(&row.lhs),
                            one_line(&row.rhs)
                        );
                    }
                }
            }
            None => {
                for row in &diff.rows {
                    let _ = writeln!(out, "{} {}: {} | {}", marker, diff.label, row.lhs, row.rhs);
                }
            }
        }
    }

    let diffs = table.diffing_attributes();
    let _ = writeln!(out, "{} differing attribute(s)", diffs.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocl_common::compare::ListAttribute;
    use ocl_common::Concept;

    fn settled(lhs: Concept, rhs: Concept) -> ComparisonView {
        let mut view = ComparisonView::new();
        let ticket = view.request("/a/", "/b/").unwrap();
        view.complete(Side::Lhs, ticket.generation, Ok(lhs));
        view.complete(Side::Rhs, ticket.generation, Ok(rhs));
        view
    }

    #[test]
    fn test_marks_differing_attribute() {
        let lhs = Concept {
            datatype: Some("N/A".to_string()),
            ..Default::default()
        };
        let rhs = Concept {
            datatype: Some("Coded".to_string()),
            ..Default::default()
        };
        let text = render_comparison(&settled(lhs, rhs), true);
        assert!(text.contains("* Datatype: N/A | Coded"));
        assert!(text.ends_with("1 differing attribute(s)\n"));
    }

    #[test]
    fn test_failure_reported() {
        let mut view = ComparisonView::new();
        let ticket = view.request("/a/", "/b/").unwrap();
        view.complete(Side::Lhs, ticket.generation, Err("Not found: /a/".to_string()));
        view.complete(Side::Rhs, ticket.generation, Ok(Concept::default()));
        let text = render_comparison(&view, false);
        assert_eq!(text, "error: lhs could not be loaded: Not found: /a/\n");
    }

    #[test]
    fn test_collapsed_list_hides_rows() {
        let mut lhs = Concept::default();
        lhs.extras = vec![ocl_common::Extra {
            key: "k".to_string(),
            value: serde_json::json!(1),
        }];
        let mut view = settled(lhs, Concept::default());
        assert!(!render_comparison(&view, false).contains("k: 1"));

        view.toggle(ListAttribute::Extras);
        assert!(render_comparison(&view, false).contains("k: 1"));
    }
}
