//! HTTP API handlers for ocl-web

pub mod buildinfo;
pub mod compare;
pub mod health;
pub mod imports;
pub mod search;
pub mod ui;

pub use buildinfo::get_build_info;
pub use compare::compare_concepts;
pub use health::health_routes;
pub use imports::{create_import, upload_import};
pub use search::search_resource;
pub use ui::{compare_page, organization_page, repository_page, search_results_page, serve_index};
