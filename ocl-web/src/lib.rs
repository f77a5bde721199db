//! ocl-web library - terminology admin service
//!
//! Serves the concept comparison page and JSON API, resource search tables,
//! organization/source/collection home pages and bulk import submission on
//! top of a remote terminology REST API.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod client;
pub mod comparison;
pub mod details;
pub mod error;
pub mod home;
pub mod importer;
pub mod pagination;
pub mod render;
pub mod resources;

use client::TerminologyApi;

/// Largest accepted bulk import upload
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Terminology API used for every upstream call
    pub api: Arc<dyn TerminologyApi>,
    /// Base URL of that API, used for links to full records
    pub api_base_url: String,
}

impl AppState {
    /// Create new application state
    pub fn new(api: Arc<dyn TerminologyApi>, api_base_url: impl Into<String>) -> Self {
        Self {
            api,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let json_api = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/concepts/compare", get(api::compare_concepts))
        .route("/api/search/:resource", get(api::search_resource))
        .route("/api/imports", post(api::create_import))
        .route(
            "/api/imports/upload",
            post(api::upload_import).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        );

    let mut pages = Router::new()
        .route("/", get(api::serve_index))
        .route("/concepts/compare", get(api::compare_page))
        .route("/search/:resource", get(api::search_results_page))
        .route("/orgs/:owner", get(api::organization_page))
        .route("/orgs/:owner/", get(api::organization_page))
        .merge(api::health_routes());

    // API URLs end in '/'; pages answer with and without it
    for owner_type in ["orgs", "users"] {
        for repo_kind in ["sources", "collections"] {
            let repo = format!("/{}/:owner/{}/:repo", owner_type, repo_kind);
            let version = format!("{}/:version", repo);
            for path in [repo.clone(), format!("{}/", repo), version.clone(), format!("{}/", version)] {
                pages = pages.route(&path, get(api::repository_page));
            }
        }
    }

    Router::new()
        .merge(json_api)
        .merge(pages)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
