mod brands;
mod comparison;
mod dashboard;
mod overview;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use retailintel_analyzer::GeminiClient;
use retailintel_core::{Dashboard, DashboardError};
use serde::Serialize;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<RwLock<Dashboard>>,
    /// `None` when no API key is configured; refresh then answers 503.
    pub analyzer: Option<Arc<GeminiClient>>,
}

impl AppState {
    #[must_use]
    pub fn new(dashboard: Dashboard, analyzer: Option<GeminiClient>) -> Self {
        Self {
            dashboard: Arc::new(RwLock::new(dashboard)),
            analyzer: analyzer.map(Arc::new),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    brands: usize,
    analyzer: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_dashboard_error(request_id: String, error: &DashboardError) -> ApiError {
    let code = match error {
        DashboardError::UnknownBrand(_) => "not_found",
        DashboardError::RefreshInFlight(_) | DashboardError::RefreshNotStarted(_) => "conflict",
        DashboardError::NoSelection | DashboardError::RefreshUnavailable(_) => "bad_request",
    };
    tracing::debug!(error = %error, code, "dashboard rejected request");
    ApiError::new(request_id, code, error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(crate::middleware::REQUEST_ID_HEADER),
        ])
}

fn api_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/dashboard", get(dashboard::get_dashboard))
        .route("/api/v1/dashboard/select", post(dashboard::select_brand))
        .route("/api/v1/dashboard/view", post(dashboard::set_view))
        .route("/api/v1/dashboard/search", post(dashboard::set_search))
        .route(
            "/api/v1/dashboard/comparison-category",
            post(dashboard::set_comparison_category),
        )
        .route("/api/v1/dashboard/refresh", post(dashboard::refresh_selected))
        .route("/api/v1/brands", get(brands::list_brands))
        .route("/api/v1/brands/{id}", get(brands::get_brand))
        .route("/api/v1/overview", get(overview::get_overview))
        .route("/api/v1/comparison", get(comparison::get_comparison))
        .route(
            "/api/v1/comparison/drilldown",
            get(comparison::get_drilldown),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

#[must_use]
pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(api_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let brands = state.dashboard.read().await.competitors().len();
    Json(ApiResponse::new(
        HealthData {
            status: "ok",
            brands,
            analyzer: if state.analyzer.is_some() {
                "configured"
            } else {
                "disabled"
            },
        },
        req_id.0,
    ))
}

#[must_use]
pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
