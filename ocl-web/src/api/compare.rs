//! Concept comparison endpoint

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use ocl_common::compare::{ComparisonTable, ComparisonView, ListAttribute, Side};
use serde::{Deserialize, Serialize};

use crate::client::validate_uri;
use crate::comparison::{parse_expand, run_comparison};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareParams {
    pub lhs: Option<String>,
    pub rhs: Option<String>,
    /// Comma-separated list attributes to show expanded
    pub expand: Option<String>,
}

impl CompareParams {
    /// Both identifiers, trimmed; blank counts as missing
    pub fn identifiers(&self) -> Option<(&str, &str)> {
        let lhs = self.lhs.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let rhs = self.rhs.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((lhs, rhs))
    }
}

/// Fetch outcome of one side
#[derive(Debug, Clone, Serialize)]
pub struct SideStatus {
    pub side: Side,
    pub uri: String,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareResponse {
    pub lhs: SideStatus,
    pub rhs: SideStatus,
    /// List attributes currently showing their rows
    pub expanded: Vec<ListAttribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<ComparisonTable>,
}

impl CompareResponse {
    pub fn from_view(view: &ComparisonView) -> Self {
        let (lhs_uri, rhs_uri) = view.identifiers().unwrap_or_default();
        let status = |side: Side, uri: &str| {
            let state = view.state(side);
            SideStatus {
                side,
                uri: uri.to_string(),
                state: state.name(),
                error: state.error().map(str::to_string),
            }
        };

        Self {
            lhs: status(Side::Lhs, lhs_uri),
            rhs: status(Side::Rhs, rhs_uri),
            expanded: ListAttribute::ALL
                .into_iter()
                .filter(|attr| view.is_expanded(*attr))
                .collect(),
            table: view.table(),
        }
    }
}

/// GET /api/concepts/compare?lhs=..&rhs=..&expand=..
///
/// 200 when both concepts loaded, 502 with per-side state when either
/// failed, 400 when an identifier is missing or not a relative API path.
pub async fn compare_concepts(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> ApiResult<(StatusCode, Json<CompareResponse>)> {
    let (lhs, rhs) = params
        .identifiers()
        .ok_or_else(|| ApiError::BadRequest("Both lhs and rhs are required".to_string()))?;
    validate_uri(lhs)?;
    validate_uri(rhs)?;

    let expanded = parse_expand(params.expand.as_deref());
    let view = run_comparison(state.api.as_ref(), lhs, rhs, &expanded).await;

    let status = if view.failures().is_empty() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };

    Ok((status, Json(CompareResponse::from_view(&view))))
}
