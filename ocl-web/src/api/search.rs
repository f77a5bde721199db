//! Paginated, sortable resource search

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::client::{validate_uri, SearchQuery, TerminologyApi};
use crate::details::{load_row_details, RowDetails};
use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, clamp_page_size, Pagination};
use crate::resources::{ResourceKind, SortParam};
use crate::AppState;

/// Query parameters of a search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Column id to sort on
    pub sort: Option<String>,
    /// `asc` or `desc`
    pub order: Option<String>,
    /// API URL of the row to show expanded
    pub expand_row: Option<String>,
}

/// Column metadata for rendering a results table
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub sortable: bool,
}

/// One rendered result row
#[derive(Debug, Clone, Serialize)]
pub struct SearchRow {
    /// API path of the record, when the item has one
    pub url: Option<String>,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub resource: ResourceKind,
    pub q: Option<String>,
    pub total: u64,
    pub pagination: Pagination,
    pub sort: Option<SortParam>,
    pub selectable: bool,
    pub expandable: bool,
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<SearchRow>,
    /// Details of the expanded row, if one on this page was asked for
    pub expanded: Option<RowDetails>,
}

pub fn parse_resource(name: &str) -> ApiResult<ResourceKind> {
    ResourceKind::from_key(name).ok_or_else(|| ApiError::NotFound(format!("Unknown resource: {}", name)))
}

/// Run one global search of `resource`
pub async fn run_search(
    api: &dyn TerminologyApi,
    resource: ResourceKind,
    params: &SearchParams,
) -> ApiResult<SearchResponse> {
    run_listing(api, resource, &resource.collection_path(), params).await
}

/// List `resource` items under `path`, re-requesting the last page when
/// the requested page lies past the end of the results.
pub async fn run_listing(
    api: &dyn TerminologyApi,
    resource: ResourceKind,
    path: &str,
    params: &SearchParams,
) -> ApiResult<SearchResponse> {
    let sort = resource.resolve_sort(params.sort.as_deref(), params.order.as_deref())?;
    let limit = clamp_page_size(params.limit);
    let requested_page = params.page.unwrap_or(1).max(1);

    let mut query = SearchQuery {
        q: params.q.clone().filter(|q| !q.trim().is_empty()),
        page: requested_page,
        limit,
        sort,
    };

    let mut page = api.list(path, &query).await?;
    let mut pagination = calculate_pagination(page.total, requested_page, limit);

    if pagination.total_pages > 0 && pagination.page != requested_page {
        tracing::debug!(
            requested = requested_page,
            clamped = pagination.page,
            "Requested page out of range, fetching last page"
        );
        query.page = pagination.page;
        page = api.list(path, &query).await?;
        pagination = calculate_pagination(page.total, pagination.page, limit);
    }

    let columns = resource.columns();
    let rows: Vec<SearchRow> = page
        .items
        .iter()
        .map(|item| SearchRow {
            url: item.get("url").and_then(|v| v.as_str()).map(str::to_string),
            cells: columns.iter().map(|column| column.render(item)).collect(),
        })
        .collect();

    let expand_row = params
        .expand_row
        .as_deref()
        .filter(|url| !url.is_empty() && resource.is_expandable());
    let expanded = match expand_row {
        Some(url) if rows.iter().any(|row| row.url.as_deref() == Some(url)) => {
            validate_uri(url)?;
            Some(load_row_details(api, resource, url).await)
        }
        Some(url) => {
            tracing::debug!(url = %url, "Expanded row is not on this page");
            None
        }
        None => None,
    };

    Ok(SearchResponse {
        resource,
        q: query.q,
        total: page.total,
        pagination,
        sort,
        selectable: resource.is_selectable(),
        expandable: resource.is_expandable(),
        columns: columns
            .iter()
            .map(|c| ColumnInfo {
                id: c.id,
                label: c.label,
                sortable: c.is_sortable(),
            })
            .collect(),
        rows,
        expanded,
    })
}

/// GET /api/search/:resource
pub async fn search_resource(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let resource = parse_resource(&resource)?;
    let response = run_search(state.api.as_ref(), resource, &params).await?;
    Ok(Json(response))
}
