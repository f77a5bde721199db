//! Server-rendered HTML pages

use std::collections::BTreeSet;

use ocl_common::compare::{AttributeDiff, ComparisonView, ConceptHeader, ListAttribute, Side};
use ocl_common::{LocaleRecord, MappingRecord};
use reqwest::Url;

use crate::api::search::SearchResponse;
use crate::comparison::format_expand;
use crate::details::{RowDetails, VersionRow};
use crate::resources::{ResourceKind, RowTab, SortOrder};

const STYLE: &str = r#"
        body {
            font-family: system-ui, -apple-system, sans-serif;
            max-width: 1200px;
            margin: 40px auto;
            padding: 20px;
            line-height: 1.5;
        }
        h1 {
            color: #333;
            border-bottom: 2px solid #0066cc;
            padding-bottom: 10px;
        }
        table { border-collapse: collapse; width: 100%; }
        th, td { border: 1px solid #ddd; padding: 6px 10px; text-align: left; vertical-align: top; white-space: pre-line; }
        th { background: #f4f4f4; }
        tr.diff td { background: #fff4e5; }
        tr.list-header td { background: #eef3fa; font-weight: bold; }
        .error { background: #fdecea; color: #a12622; padding: 10px; border-radius: 4px; margin: 10px 0; }
        .button {
            display: inline-block;
            padding: 8px 16px;
            background: #0066cc;
            color: white;
            text-decoration: none;
            border-radius: 4px;
            border: none;
            margin: 6px 4px;
        }
        .pager { margin: 12px 0; }
        .tabs { border-bottom: 1px solid #ddd; margin: 16px 0; }
        .tabs a { display: inline-block; padding: 6px 14px; text-decoration: none; color: #0066cc; }
        .tabs a.active { border-bottom: 3px solid #0066cc; font-weight: bold; }
        tr.details > td { background: #fafafa; }
        tr.details table { margin: 4px 0 12px; }
        small { color: #666; }
"#;

/// Escape text for use in element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `path?k=v&...` with form-encoded values; empty values are left out
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    let params: Vec<(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).copied().collect();
    match Url::parse_with_params(&format!("http://localhost{}", path), &params) {
        Ok(url) => match url.query() {
            Some(query) if !query.is_empty() => format!("{}?{}", url.path(), query),
            _ => url.path().to_string(),
        },
        Err(_) => path.to_string(),
    }
}

pub(crate) fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
{body}
    <p><small>Module: ocl-web v{version}</small></p>
</body>
</html>
"#,
        title = escape_html(title),
        style = STYLE,
        body = body,
        version = env!("CARGO_PKG_VERSION"),
    )
}

/// Landing page linking search, compare and bulk import
pub fn index_page() -> String {
    let links: String = ResourceKind::ALL
        .iter()
        .map(|kind| {
            format!(
                r#"<a href="/search/{}" class="button">{}</a>"#,
                kind.key(),
                kind.title()
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ");

    let body = format!(
        r#"    <h1>OCL Terminology Admin</h1>
    <h2>Browse</h2>
    <p>
        {links}
    </p>

    <h2>Compare concepts</h2>
    {compare_form}

    <h2>Bulk import</h2>
    <form action="/api/imports/upload" method="post" enctype="multipart/form-data">
        <p><input type="file" name="file" required></p>
        <p><label>Queue <input type="text" name="queue" placeholder="e.g. my-queue"></label></p>
        <p>
            <label><input type="checkbox" name="update_if_exists" value="true" checked> Update existing</label>
            <label><input type="checkbox" name="parallel" value="true"> Parallel</label>
            <label>Workers <input type="number" name="workers" value="1" min="1"></label>
        </p>
        <p><button type="submit" class="button">Import</button></p>
    </form>
"#,
        links = links,
        compare_form = compare_form("", ""),
    );
    page("OCL Terminology Admin", &body)
}

fn compare_form(lhs: &str, rhs: &str) -> String {
    format!(
        r#"<form action="/concepts/compare" method="get">
        <p><label>Left <input type="text" name="lhs" size="60" value="{lhs}" placeholder="/orgs/CIEL/sources/CIEL/concepts/1/"></label></p>
        <p><label>Right <input type="text" name="rhs" size="60" value="{rhs}"></label></p>
        <p><button type="submit" class="button">Compare</button></p>
    </form>"#,
        lhs = escape_html(lhs),
        rhs = escape_html(rhs),
    )
}

/// This service's page for an API record URL
pub(crate) fn record_path(api_url: &str) -> String {
    let path = api_url.trim_end_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// Concept name links to its row, expanded, in the parent repository's
/// concept list; the source name links to that repository's page.
fn header_cell(header: &ConceptHeader, api_base_url: &str) -> String {
    let parent = record_path(&header.parent_url);
    let concept = with_query(
        &parent,
        &[
            ("tab", "concepts"),
            ("q", header.id.as_str()),
            ("expand_row", header.url.as_str()),
        ],
    );
    format!(
        r#"<th><a href="{concept}">{name}</a> <small><a href="{base}{url}">API</a></small><br><small>{class} | <a href="{parent}">{source}</a></small></th>"#,
        concept = escape_html(&concept),
        name = escape_html(&header.display_name),
        base = escape_html(api_base_url),
        url = escape_html(&header.url),
        class = escape_html(&header.concept_class),
        parent = escape_html(&parent),
        source = escape_html(&header.source),
    )
}

fn toggle_link(lhs: &str, rhs: &str, expanded: &BTreeSet<ListAttribute>, attr: ListAttribute) -> String {
    let mut toggled = expanded.clone();
    if !toggled.remove(&attr) {
        toggled.insert(attr);
    }
    let expand = format_expand(&toggled);
    with_query(
        "/concepts/compare",
        &[("lhs", lhs), ("rhs", rhs), ("expand", expand.as_str())],
    )
}

fn diff_row(label: &str, lhs: &str, rhs: &str, is_diff: bool) -> String {
    let class = if is_diff { r#" class="diff""# } else { "" };
    format!(
        "<tr{class}><td>{label}</td><td>{lhs}</td><td>{rhs}</td></tr>",
        class = class,
        label = label,
        lhs = escape_html(lhs),
        rhs = escape_html(rhs),
    )
}

fn attribute_rows(
    diff: &AttributeDiff,
    view: &ComparisonView,
    lhs: &str,
    rhs: &str,
    expanded: &BTreeSet<ListAttribute>,
) -> String {
    let Some(list) = diff.list_attribute() else {
        return diff
            .rows
            .iter()
            .map(|row| diff_row(&escape_html(diff.label), &row.lhs, &row.rhs, row.is_diff))
            .collect();
    };

    let is_expanded = view.is_expanded(list);
    let marker = if is_expanded { "&#9660;" } else { "&#9654;" };
    let class = if diff.is_diff { "list-header diff" } else { "list-header" };
    let mut html = format!(
        r#"<tr class="{class}"><td><a href="{href}">{marker} {label}</a></td><td>{lhs_count}</td><td>{rhs_count}</td></tr>"#,
        class = class,
        href = escape_html(&toggle_link(lhs, rhs, expanded, list)),
        marker = marker,
        label = escape_html(diff.label),
        lhs_count = diff.lhs_count.unwrap_or_default(),
        rhs_count = diff.rhs_count.unwrap_or_default(),
    );
    if is_expanded {
        for row in &diff.rows {
            html.push_str(&diff_row("", &row.lhs, &row.rhs, row.is_diff));
        }
    }
    html
}

/// Side-by-side comparison page
///
/// `error` is a request-level problem, such as a malformed identifier,
/// shown the same way as a side that failed to load.
pub fn comparison_page(
    view: Option<&ComparisonView>,
    lhs: &str,
    rhs: &str,
    expanded: &BTreeSet<ListAttribute>,
    error: Option<&str>,
    api_base_url: &str,
) -> String {
    let mut body = String::from("    <h1>Compare Concepts</h1>\n    ");
    body.push_str(&compare_form(lhs, rhs));

    if let Some(message) = error {
        body.push_str(&format!(
            r#"
    <div class="error">{}</div>"#,
            escape_html(message)
        ));
    }

    if let Some(view) = view {
        for (side, message) in view.failures() {
            let which = match side {
                Side::Lhs => "Left",
                Side::Rhs => "Right",
            };
            body.push_str(&format!(
                r#"
    <div class="error">{} concept could not be loaded: {}</div>"#,
                which,
                escape_html(message)
            ));
        }

        if let Some(table) = view.table() {
            let rows: String = table
                .attributes
                .iter()
                .map(|diff| attribute_rows(diff, view, lhs, rhs, expanded))
                .collect::<Vec<_>>()
                .join("\n        ");
            body.push_str(&format!(
                r#"
    <table>
        <tr><th>Attribute</th>{lhs_header}{rhs_header}</tr>
        {rows}
    </table>"#,
                lhs_header = header_cell(&table.lhs, api_base_url),
                rhs_header = header_cell(&table.rhs, api_base_url),
                rows = rows,
            ));
        }
    }

    page("Compare Concepts", &body)
}

/// Where a results table's links and forms point
#[derive(Debug, Clone, Copy)]
pub struct ListingTarget<'a> {
    pub path: &'a str,
    /// Parameters every link and form keeps, such as the active tab
    pub fixed: &'a [(&'a str, &'a str)],
}

fn listing_link(
    response: &SearchResponse,
    target: ListingTarget<'_>,
    page: u64,
    sort: Option<(&str, SortOrder)>,
    expand_row: &str,
) -> String {
    let page = page.to_string();
    let limit = response.pagination.page_size.to_string();
    let (sort_id, order) = match sort {
        Some((id, order)) => (id, order.as_str()),
        None => ("", ""),
    };
    let mut params: Vec<(&str, &str)> = target.fixed.to_vec();
    params.extend([
        ("q", response.q.as_deref().unwrap_or_default()),
        ("page", page.as_str()),
        ("limit", limit.as_str()),
        ("sort", sort_id),
        ("order", order),
        ("expand_row", expand_row),
    ]);
    with_query(target.path, &params)
}

fn table_of(header: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return "<p><small>None</small></p>".to_string();
    }
    let header: String = header.iter().map(|h| format!("<th>{}</th>", h)).collect();
    let rows: String = rows
        .into_iter()
        .map(|cells| {
            let cells: String = cells.iter().map(|c| format!("<td>{}</td>", escape_html(c))).collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect();
    format!("<table><tr>{}</tr>{}</table>", header, rows)
}

/// Version history table, shared with repository History/Versions tabs
pub(crate) fn versions_table(versions: &[VersionRow]) -> String {
    table_of(
        &["Version", "Created", "By", "Comment", "Released"],
        versions
            .iter()
            .map(|v| {
                vec![
                    v.id.clone(),
                    v.created_on.clone(),
                    v.created_by.clone(),
                    v.comment.clone(),
                    if v.released { "Yes" } else { "" }.to_string(),
                ]
            })
            .collect(),
    )
}

fn locales_table(locales: &[LocaleRecord], text_label: &str) -> String {
    table_of(
        &[text_label, "Type", "Locale", "Preferred"],
        locales
            .iter()
            .map(|l| {
                vec![
                    l.text.clone(),
                    l.type_tag.clone().unwrap_or_default(),
                    l.locale.clone(),
                    if l.locale_preferred { "Yes" } else { "" }.to_string(),
                ]
            })
            .collect(),
    )
}

fn mappings_table(mappings: &[MappingRecord]) -> String {
    let concept = |code: &Option<String>, name: &Option<String>| {
        [code.as_deref(), name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    };
    table_of(
        &["Type", "From Concept", "To Concept", "Source"],
        mappings
            .iter()
            .map(|m| {
                vec![
                    m.map_type.clone(),
                    concept(&m.from_concept_code, &m.from_concept_name),
                    concept(&m.to_concept_code, &m.to_concept_name),
                    m.source.clone(),
                ]
            })
            .collect(),
    )
}

fn row_details(details: &RowDetails) -> String {
    details
        .tabs
        .iter()
        .map(|tab| {
            let content = match tab {
                RowTab::Mappings => mappings_table(&details.mappings),
                RowTab::Synonyms => locales_table(&details.names, "Name"),
                RowTab::Descriptions => locales_table(&details.descriptions, "Description"),
                RowTab::History | RowTab::Versions => versions_table(&details.versions),
            };
            format!("<h4>{}</h4>{}", tab.label(), content)
        })
        .collect()
}

/// Search box, pager and results table of one listing
pub fn listing_section(response: &SearchResponse, target: ListingTarget<'_>) -> String {
    let current_sort = response.sort.map(|s| (s.column_id, s.order));
    let expanded_url = response.expanded.as_ref().map(|d| d.url.as_str()).unwrap_or_default();
    let selectable = response.selectable;
    let expandable = response.expandable;

    let mut header = String::new();
    if selectable {
        header.push_str("<th>Left</th><th>Right</th>");
    }
    for column in &response.columns {
        if !column.sortable {
            header.push_str(&format!("<th>{}</th>", escape_html(column.label)));
            continue;
        }
        let (order, arrow) = match current_sort {
            Some((id, order)) if id == column.id => (order.flipped(), if order == SortOrder::Asc { " &#9650;" } else { " &#9660;" }),
            _ => (SortOrder::Desc, ""),
        };
        header.push_str(&format!(
            r#"<th><a href="{}">{}</a>{}</th>"#,
            escape_html(&listing_link(response, target, 1, Some((column.id, order)), "")),
            escape_html(column.label),
            arrow
        ));
    }
    if expandable {
        header.push_str("<th></th>");
    }
    let span = response.columns.len() + if selectable { 2 } else { 0 } + usize::from(expandable);

    let rows: String = response
        .rows
        .iter()
        .map(|row| {
            let url = row.url.as_deref().unwrap_or_default();
            let is_open = !url.is_empty() && url == expanded_url;
            let mut html = String::from("<tr>");
            if selectable {
                html.push_str(&format!(
                    r#"<td><input type="radio" name="lhs" value="{url}"></td><td><input type="radio" name="rhs" value="{url}"></td>"#,
                    url = escape_html(url)
                ));
            }
            for cell in &row.cells {
                html.push_str(&format!("<td>{}</td>", escape_html(cell)));
            }
            if expandable {
                if url.is_empty() {
                    html.push_str("<td></td>");
                } else {
                    let (marker, toggled) = if is_open { ("&#9650;", "") } else { ("&#9660;", url) };
                    let href = listing_link(response, target, response.pagination.page, current_sort, toggled);
                    html.push_str(&format!(
                        r#"<td><a href="{}" title="Expand row">{}</a></td>"#,
                        escape_html(&href),
                        marker
                    ));
                }
            }
            html.push_str("</tr>");
            if let Some(details) = response.expanded.as_ref().filter(|_| is_open) {
                html.push_str(&format!(
                    r#"<tr class="details"><td colspan="{}">{}</td></tr>"#,
                    span,
                    row_details(details)
                ));
            }
            html
        })
        .collect::<Vec<_>>()
        .join("\n        ");

    let pagination = response.pagination;
    let mut pager = format!(
        "Page {} of {} ({} results)",
        pagination.page,
        pagination.total_pages.max(1),
        response.total
    );
    if pagination.has_previous() {
        pager.push_str(&format!(
            r#" <a href="{}">Previous</a>"#,
            escape_html(&listing_link(response, target, pagination.page - 1, current_sort, ""))
        ));
    }
    if pagination.has_next() {
        pager.push_str(&format!(
            r#" <a href="{}">Next</a>"#,
            escape_html(&listing_link(response, target, pagination.page + 1, current_sort, ""))
        ));
    }

    let table = format!(
        r#"<table>
        <tr>{header}</tr>
        {rows}
    </table>"#,
        header = header,
        rows = rows
    );
    let table = if selectable {
        format!(
            r#"<form action="/concepts/compare" method="get">
    {table}
    <p><button type="submit" class="button">Compare selected</button></p>
    </form>"#,
            table = table
        )
    } else {
        table
    };

    let hidden: String = target
        .fixed
        .iter()
        .map(|(name, value)| {
            format!(
                r#"<input type="hidden" name="{}" value="{}">"#,
                escape_html(name),
                escape_html(value)
            )
        })
        .collect();

    format!(
        r#"<form action="{path}" method="get">
        {hidden}<input type="text" name="q" value="{q}" placeholder="Search {title}">
        <button type="submit" class="button">Search</button>
    </form>
    <div class="pager">{pager}</div>
    {table}"#,
        path = escape_html(target.path),
        hidden = hidden,
        q = escape_html(response.q.as_deref().unwrap_or_default()),
        title = response.resource.title(),
        pager = pager,
        table = table,
    )
}

/// Results table for one resource
pub fn search_page(response: &SearchResponse) -> String {
    let resource = response.resource;
    let path = format!("/search/{}", resource.key());
    let target = ListingTarget {
        path: &path,
        fixed: &[],
    };

    let body = format!(
        r#"    <h1>{title}</h1>
    {listing}
    <p><a href="/">Home</a></p>"#,
        title = resource.title(),
        listing = listing_section(response, target),
    );

    page(resource.title(), &body)
}
