use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use retailintel_core::{filter_by_name, CompetitorData, RefreshStatus};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct BrandListQuery {
    /// Overrides the dashboard's stored search term for this request.
    pub search: Option<String>,
}

/// One sidebar entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BrandListItem {
    id: String,
    name: String,
    url: String,
    logo: String,
    total_styles: u32,
    last_updated: DateTime<Utc>,
    selected: bool,
    refreshing: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BrandDetail {
    #[serde(flatten)]
    record: CompetitorData,
    refresh: Option<RefreshStatus>,
}

/// GET /api/v1/brands
pub(super) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BrandListQuery>,
) -> Json<ApiResponse<Vec<BrandListItem>>> {
    let dashboard = state.dashboard.read().await;
    let highlighted = dashboard.highlighted_id();

    let to_item = |c: &CompetitorData| BrandListItem {
        id: c.id.clone(),
        name: c.name.clone(),
        url: c.url.clone(),
        logo: c.logo.clone(),
        total_styles: c.total_styles,
        last_updated: c.last_updated,
        selected: highlighted == Some(c.id.as_str()),
        refreshing: dashboard.is_refreshing(&c.id),
    };

    let visible = match query.search.as_deref() {
        Some(term) => filter_by_name(dashboard.competitors(), term),
        None => dashboard.visible_competitors(),
    };
    let data: Vec<BrandListItem> = visible.into_iter().map(to_item).collect();

    Json(ApiResponse::new(data, req_id.0))
}

/// GET /api/v1/brands/{id}
pub(super) async fn get_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BrandDetail>>, ApiError> {
    let dashboard = state.dashboard.read().await;
    let record = dashboard
        .find(&id)
        .cloned()
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", format!("unknown brand id: {id}")))?;

    Ok(Json(ApiResponse::new(
        BrandDetail {
            refresh: dashboard.refresh_status(&id).cloned(),
            record,
        },
        req_id.0,
    )))
}
