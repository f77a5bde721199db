//! UI routes: server-rendered HTML pages

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};

use super::compare::CompareParams;
use super::search::{parse_resource, run_search, SearchParams};
use crate::client::validate_uri;
use crate::comparison::{parse_expand, run_comparison};
use crate::error::ApiError;
use crate::home::{load_organization, load_repository, HomeParams, RepoLocation};
use crate::render::{comparison_page, home_page, index_page, search_page};
use crate::AppState;

/// GET /
pub async fn serve_index() -> Html<String> {
    Html(index_page())
}

/// GET /concepts/compare
///
/// Without both identifiers only the form is shown. Fetch failures are
/// rendered as banners above the form.
pub async fn compare_page(State(state): State<AppState>, Query(params): Query<CompareParams>) -> Response {
    let expanded = parse_expand(params.expand.as_deref());
    let base = state.api_base_url.as_str();

    let Some((lhs, rhs)) = params.identifiers() else {
        let lhs = params.lhs.as_deref().unwrap_or_default();
        let rhs = params.rhs.as_deref().unwrap_or_default();
        return Html(comparison_page(None, lhs, rhs, &expanded, None, base)).into_response();
    };

    if let Err(err) = validate_uri(lhs).and_then(|_| validate_uri(rhs)) {
        let message = err.to_string();
        let html = comparison_page(None, lhs, rhs, &expanded, Some(&message), base);
        return (StatusCode::BAD_REQUEST, Html(html)).into_response();
    }

    let view = run_comparison(state.api.as_ref(), lhs, rhs, &expanded).await;
    Html(comparison_page(Some(&view), lhs, rhs, &expanded, None, base)).into_response()
}

/// GET /search/:resource
pub async fn search_results_page(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(params): Query<SearchParams>,
) -> Response {
    let result = match parse_resource(&resource) {
        Ok(kind) => run_search(state.api.as_ref(), kind, &params).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(response) => Html(search_page(&response)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// GET /orgs/:owner
pub async fn organization_page(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Query(params): Query<HomeParams>,
) -> Response {
    match load_organization(state.api.as_ref(), &org, &params).await {
        Ok(home) => Html(home_page(&home)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// GET /{orgs|users}/:owner/{sources|collections}/:repo[/:version]
///
/// One handler serves every owner type and repository kind; the kind is
/// read back from the request path.
pub async fn repository_page(State(state): State<AppState>, uri: Uri, Query(params): Query<HomeParams>) -> Response {
    let Some(location) = RepoLocation::from_path(uri.path()) else {
        return ApiError::NotFound(uri.path().to_string()).into_response();
    };

    match load_repository(state.api.as_ref(), &location, &params).await {
        Ok(home) => Html(home_page(&home)).into_response(),
        Err(err) => err.into_response(),
    }
}
