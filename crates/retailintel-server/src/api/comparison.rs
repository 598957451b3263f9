use axum::{
    extract::{Query, State},
    Extension, Json,
};
use retailintel_core::aggregate::{
    assortment_volume, category_drilldown, category_heatmap, market_leader, pricing_curve,
    BrandVolume, DrilldownRow, HeatmapRow, PricingCurveRow, HEATMAP_SCALE,
};
use retailintel_core::Category;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

/// Cross-brand projections for the comparison view.
#[derive(Debug, Serialize)]
pub(super) struct ComparisonData {
    volume: Vec<BrandVolume>,
    market_leader: Option<BrandVolume>,
    pricing_curve: Vec<PricingCurveRow>,
    heatmap: Vec<HeatmapRow>,
    heatmap_scale: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct DrilldownQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct DrilldownData {
    category: Category,
    rows: Vec<DrilldownRow>,
}

/// GET /api/v1/comparison
pub(super) async fn get_comparison(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ComparisonData>> {
    let dashboard = state.dashboard.read().await;
    let records = dashboard.competitors();

    let data = ComparisonData {
        volume: assortment_volume(records),
        market_leader: market_leader(records),
        pricing_curve: pricing_curve(records),
        heatmap: category_heatmap(records),
        heatmap_scale: HEATMAP_SCALE,
    };

    Json(ApiResponse::new(data, req_id.0))
}

/// GET /api/v1/comparison/drilldown
///
/// Without `category`, uses the dashboard's comparison category.
pub(super) async fn get_drilldown(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DrilldownQuery>,
) -> Result<Json<ApiResponse<DrilldownData>>, ApiError> {
    let dashboard = state.dashboard.read().await;

    let category = match query.category.as_deref() {
        Some(label) => label
            .parse::<Category>()
            .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?,
        None => dashboard.comparison_category(),
    };

    let data = DrilldownData {
        category,
        rows: category_drilldown(dashboard.competitors(), category),
    };

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
