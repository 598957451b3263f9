//! Dashboard state routes: read the UI state and apply actions to it.

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use retailintel_analyzer::GeminiClient;
use retailintel_core::{
    Action, Category, CompetitorData, DashboardSnapshot, RefreshTicket, ViewMode,
};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_dashboard_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SelectRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ViewRequest {
    pub view: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchRequest {
    #[serde(default)]
    pub term: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CategoryRequest {
    pub category: String,
}

type SnapshotResponse = Result<Json<ApiResponse<DashboardSnapshot>>, ApiError>;

/// Applies one action and answers with the resulting UI state.
async fn apply_action(state: &AppState, req_id: String, action: Action) -> SnapshotResponse {
    let mut dashboard = state.dashboard.write().await;
    dashboard
        .apply(action)
        .map_err(|e| map_dashboard_error(req_id.clone(), &e))?;
    Ok(Json(ApiResponse::new(dashboard.snapshot(), req_id)))
}

/// GET /api/v1/dashboard
pub(super) async fn get_dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<DashboardSnapshot>> {
    let snapshot = state.dashboard.read().await.snapshot();
    Json(ApiResponse::new(snapshot, req_id.0))
}

/// POST /api/v1/dashboard/select
pub(super) async fn select_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SelectRequest>,
) -> SnapshotResponse {
    apply_action(&state, req_id.0, Action::Select(body.id)).await
}

/// POST /api/v1/dashboard/view
pub(super) async fn set_view(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ViewRequest>,
) -> SnapshotResponse {
    let view: ViewMode = body
        .view
        .parse()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", format!("{e}")))?;
    apply_action(&state, req_id.0, Action::SetView(view)).await
}

/// POST /api/v1/dashboard/search
pub(super) async fn set_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SearchRequest>,
) -> SnapshotResponse {
    apply_action(&state, req_id.0, Action::Search(body.term)).await
}

/// POST /api/v1/dashboard/comparison-category
pub(super) async fn set_comparison_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CategoryRequest>,
) -> SnapshotResponse {
    let category: Category = body
        .category
        .parse()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", format!("{e}")))?;
    apply_action(&state, req_id.0, Action::SetComparisonCategory(category)).await
}

/// POST /api/v1/dashboard/refresh: re-analyze the selected brand.
///
/// The analyzer runs on its own task without holding the dashboard lock, so
/// a dropped connection still clears the in-flight mark.
pub(super) async fn refresh_selected(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<CompetitorData>>, ApiError> {
    let rid = req_id.0;

    let Some(analyzer) = state.analyzer.clone() else {
        return Err(ApiError::new(
            rid,
            "service_unavailable",
            "live analysis is disabled: GEMINI_API_KEY is not configured",
        ));
    };

    let ticket = state
        .dashboard
        .write()
        .await
        .begin_refresh()
        .map_err(|e| map_dashboard_error(rid.clone(), &e))?;

    let id = ticket.id.clone();
    let task = tokio::spawn(run_refresh(state.clone(), analyzer, ticket));
    match task.await {
        Ok(Ok(record)) => Ok(Json(ApiResponse::new(record, rid))),
        Ok(Err(message)) => Err(ApiError::new(
            rid,
            "upstream_error",
            format!("assortment analysis failed: {message}"),
        )),
        Err(e) => {
            tracing::error!(brand_id = %id, error = %e, "refresh task aborted");
            let failed = state.dashboard.write().await.apply(Action::RefreshFailed {
                id: id.clone(),
                message: "refresh task aborted".to_string(),
            });
            if let Err(e) = failed {
                tracing::debug!(brand_id = %id, error = %e, "refresh already settled");
            }
            Err(ApiError::new(rid, "internal_error", "refresh task aborted"))
        }
    }
}

/// Runs the analyzer for `ticket` and applies the outcome.
///
/// Returns the stored record on success, or the failure message.
async fn run_refresh(
    state: AppState,
    analyzer: Arc<GeminiClient>,
    ticket: RefreshTicket,
) -> Result<CompetitorData, String> {
    let outcome = analyzer.analyze(&ticket.name, &ticket.url).await;

    let mut dashboard = state.dashboard.write().await;
    match outcome {
        Ok(analysis) => {
            dashboard
                .apply(Action::RefreshSucceeded {
                    id: ticket.id.clone(),
                    record: Box::new(analysis.record),
                })
                .map_err(|e| e.to_string())?;
            dashboard
                .find(&ticket.id)
                .cloned()
                .ok_or_else(|| format!("brand {} disappeared during refresh", ticket.id))
        }
        Err(e) => {
            let message = e.to_string();
            dashboard
                .apply(Action::RefreshFailed {
                    id: ticket.id,
                    message: message.clone(),
                })
                .map_err(|e| e.to_string())?;
            Err(message)
        }
    }
}
