use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use retailintel_core::aggregate::{
    brand_matrix, category_mix, overview_summary, price_distribution, BucketCount, CategoryTotal,
    MatrixRow, OverviewSummary, BRAND_MATRIX_SCALE,
};
use retailintel_core::{DashboardError, GroundingSource};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_dashboard_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OverviewBrand {
    id: String,
    name: String,
    url: String,
    logo: String,
    last_updated: DateTime<Utc>,
    sources: Vec<GroundingSource>,
}

/// Everything the single-brand overview and matrix views render.
#[derive(Debug, Serialize)]
pub(super) struct OverviewData {
    brand: OverviewBrand,
    summary: OverviewSummary,
    price_distribution: Vec<BucketCount>,
    category_mix: Vec<CategoryTotal>,
    matrix: Vec<MatrixRow>,
    matrix_scale: u32,
}

/// GET /api/v1/overview
pub(super) async fn get_overview(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<OverviewData>>, ApiError> {
    let dashboard = state.dashboard.read().await;
    let record = dashboard
        .selected()
        .ok_or_else(|| map_dashboard_error(req_id.0.clone(), &DashboardError::NoSelection))?;

    let data = OverviewData {
        brand: OverviewBrand {
            id: record.id.clone(),
            name: record.name.clone(),
            url: record.url.clone(),
            logo: record.logo.clone(),
            last_updated: record.last_updated,
            sources: record.sources.clone().unwrap_or_default(),
        },
        summary: overview_summary(record),
        price_distribution: price_distribution(record),
        category_mix: category_mix(record),
        matrix: brand_matrix(record),
        matrix_scale: BRAND_MATRIX_SCALE,
    };

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
