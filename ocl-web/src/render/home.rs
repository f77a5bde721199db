//! Organization, source and collection home pages

use super::html::{escape_html, listing_section, page, versions_table, with_query, ListingTarget};
use crate::home::{HomeKind, HomePage, TabContent, HEAD};
use crate::resources::scalar_text;

fn tab_bar(home: &HomePage) -> String {
    let links: String = home
        .tabs
        .iter()
        .map(|tab| {
            let class = if *tab == home.tab { r#" class="active""# } else { "" };
            format!(
                r#"<a href="{}"{}>{}</a>"#,
                escape_html(&with_query(&home.page_path, &[("tab", tab.key())])),
                class,
                tab.label()
            )
        })
        .collect();
    format!(r#"<nav class="tabs">{}</nav>"#, links)
}

/// HEAD plus one link per version, keeping the active tab
fn version_bar(home: &HomePage) -> String {
    if home.kind == HomeKind::Organization {
        return String::new();
    }
    let selected = home.version.as_deref().unwrap_or(HEAD);
    let links: String = std::iter::once(HEAD)
        .chain(home.versions.iter().map(String::as_str))
        .map(|version| {
            let path = if version == HEAD {
                home.home_path.clone()
            } else {
                format!("{}/{}", home.home_path, version)
            };
            let href = with_query(&path, &[("tab", home.tab.key())]);
            if version == selected {
                format!("<strong>{}</strong>", escape_html(version))
            } else {
                format!(r#"<a href="{}">{}</a>"#, escape_html(&href), escape_html(version))
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");
    format!("<p><small>Version: {}</small></p>", links)
}

fn tab_content(home: &HomePage) -> String {
    match &home.content {
        TabContent::Listing(response) => {
            let fixed = [("tab", home.tab.key())];
            listing_section(
                response,
                ListingTarget {
                    path: &home.page_path,
                    fixed: &fixed,
                },
            )
        }
        TabContent::Details(rows) => {
            let rows: String = rows
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(label, value)| format!("<tr><th>{}</th><td>{}</td></tr>", label, escape_html(value)))
                .collect();
            format!("<table>{}</table>", rows)
        }
        TabContent::Versions(versions) => versions_table(versions),
        TabContent::About(text) if text.is_empty() => "<p><small>Nothing here yet</small></p>".to_string(),
        TabContent::About(text) => format!("<p>{}</p>", escape_html(text)),
    }
}

/// Home page of an organization, source or collection
pub fn home_page(home: &HomePage) -> String {
    let name = home.name();
    let description = scalar_text(home.record.get("description"));
    let owner = scalar_text(home.record.get("owner"));

    let mut subtitle = home.kind.title().to_string();
    if !owner.is_empty() {
        subtitle.push_str(&format!(" owned by {}", owner));
    }

    let body = format!(
        r#"    <h1>{name}</h1>
    <p><small>{subtitle}</small></p>
    {description}
    {versions}
    {tabs}
    {content}
    <p><a href="/">Home</a></p>"#,
        name = escape_html(&name),
        subtitle = escape_html(&subtitle),
        description = if description.is_empty() {
            String::new()
        } else {
            format!("<p>{}</p>", escape_html(&description))
        },
        versions = version_bar(home),
        tabs = tab_bar(home),
        content = tab_content(home),
    );

    page(&name, &body)
}
