use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::response::Response;
use rand::rngs::StdRng;
use rand::SeedableRng;
use retailintel_core::synth::synthesize_with;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

const GEMINI_PATH: &str = "/v1beta/models/gemini-test:generateContent";

fn seeded_dashboard() -> Dashboard {
    let mut rng = StdRng::seed_from_u64(42);
    Dashboard::new(vec![
        synthesize_with(&mut rng, "Buck Mason", "https://www.buckmason.com/", None),
        synthesize_with(&mut rng, "Ralph Lauren", "https://www.ralphlauren.com/men", None),
        synthesize_with(&mut rng, "Suit Supply", "https://suitsupply.com/en-us/", None),
    ])
}

fn app_without_analyzer() -> (Router, AppState) {
    let state = AppState::new(seeded_dashboard(), None);
    (build_app(state.clone(), default_rate_limit_state()), state)
}

fn app_with_analyzer(base_url: &str) -> (Router, AppState) {
    let client = GeminiClient::with_base_url("test-key", "gemini-test", 5, base_url)
        .expect("client construction should not fail");
    let state = AppState::new(seeded_dashboard(), Some(client));
    (build_app(state.clone(), default_rate_limit_state()), state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

async fn id_of(state: &AppState, name: &str) -> String {
    state
        .dashboard
        .read()
        .await
        .competitors()
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.id.clone())
        .expect("brand present")
}

fn gemini_reply(total: u32) -> serde_json::Value {
    let text = serde_json::json!({
        "totalStyles": total,
        "data": [
            { "category": "Polos", "counts": { "Under $100": total } }
        ]
    })
    .to_string();
    serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] },
            "groundingMetadata": {
                "groundingChunks": [
                    { "web": { "uri": "https://www.buckmason.com/collections/polos", "title": "Polos" } }
                ]
            }
        }]
    })
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("not_found", StatusCode::NOT_FOUND),
        ("validation_error", StatusCode::BAD_REQUEST),
        ("conflict", StatusCode::CONFLICT),
        ("upstream_error", StatusCode::BAD_GATEWAY),
        ("service_unavailable", StatusCode::SERVICE_UNAVAILABLE),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "msg").into_response();
        assert_eq!(response.status(), status, "code {code}");
    }
}

#[test]
fn dashboard_errors_map_to_api_codes() {
    let err = map_dashboard_error("r".into(), &DashboardError::RefreshInFlight("x".into()));
    assert_eq!(err.error.code, "conflict");
    let err = map_dashboard_error("r".into(), &DashboardError::UnknownBrand("x".into()));
    assert_eq!(err.error.code, "not_found");
    let err = map_dashboard_error("r".into(), &DashboardError::NoSelection);
    assert_eq!(err.error.code, "bad_request");
}

#[tokio::test]
async fn health_reports_brand_count_and_analyzer_state() {
    let (app, _) = app_without_analyzer();
    let response = app.oneshot(get("/api/v1/health")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let json = json_body(response).await;
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["brands"], 3);
    assert_eq!(json["data"]["analyzer"], "disabled");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn dashboard_starts_on_first_brand_in_overview() {
    let (app, state) = app_without_analyzer();
    let first = id_of(&state, "Buck Mason").await;

    let json = json_body(app.oneshot(get("/api/v1/dashboard")).await.expect("response")).await;
    assert_eq!(json["data"]["view"], "overview");
    assert_eq!(json["data"]["selected_id"], first.as_str());
    assert_eq!(json["data"]["highlighted_id"], first.as_str());
    assert_eq!(json["data"]["comparison_category"], "Tees, Henleys & Tanks");
    assert_eq!(json["data"]["analyzing"], false);
}

#[tokio::test]
async fn brand_list_filters_by_search_query() {
    let (app, _) = app_without_analyzer();
    let response = app
        .oneshot(get("/api/v1/brands?search=MASON"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Buck Mason");
    assert_eq!(data[0]["selected"], true);
    assert!(data[0]["totalStyles"].as_u64().is_some());
}

#[tokio::test]
async fn stored_search_term_filters_sidebar_but_not_comparison() {
    let (app, _) = app_without_analyzer();
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/dashboard/search",
            &serde_json::json!({ "term": "ralph" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let brands = json_body(app.clone().oneshot(get("/api/v1/brands")).await.expect("response")).await;
    assert_eq!(brands["data"].as_array().map(Vec::len), Some(1));

    let comparison =
        json_body(app.oneshot(get("/api/v1/comparison")).await.expect("response")).await;
    assert_eq!(comparison["data"]["volume"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn get_brand_returns_404_for_unknown_id() {
    let (app, _) = app_without_analyzer();
    let response = app
        .oneshot(get("/api/v1/brands/does-not-exist"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn select_changes_overview_brand() {
    let (app, state) = app_without_analyzer();
    let ralph = id_of(&state, "Ralph Lauren").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/dashboard/select",
            &serde_json::json!({ "id": ralph }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(app.oneshot(get("/api/v1/overview")).await.expect("response")).await;
    assert_eq!(json["data"]["brand"]["name"], "Ralph Lauren");
    assert_eq!(json["data"]["price_distribution"].as_array().map(Vec::len), Some(8));
    assert_eq!(json["data"]["matrix"].as_array().map(Vec::len), Some(16));
    assert_eq!(json["data"]["matrix_scale"], 25);
}

#[tokio::test]
async fn select_unknown_brand_is_not_found() {
    let (app, _) = app_without_analyzer();
    let response = app
        .oneshot(post_json(
            "/api/v1/dashboard/select",
            &serde_json::json!({ "id": "nope" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn set_view_rejects_unknown_mode() {
    let (app, _) = app_without_analyzer();
    let response = app
        .oneshot(post_json(
            "/api/v1/dashboard/view",
            &serde_json::json!({ "view": "grid" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comparison_view_clears_highlight() {
    let (app, _) = app_without_analyzer();
    let response = app
        .oneshot(post_json(
            "/api/v1/dashboard/view",
            &serde_json::json!({ "view": "comparison" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["view"], "comparison");
    assert!(json["data"]["highlighted_id"].is_null());
    assert!(json["data"]["selected_id"].is_string());
}

#[tokio::test]
async fn comparison_covers_every_bucket_and_category() {
    let (app, _) = app_without_analyzer();
    let json = json_body(app.oneshot(get("/api/v1/comparison")).await.expect("response")).await;

    let curve = json["data"]["pricing_curve"].as_array().expect("curve");
    assert_eq!(curve.len(), 8);
    assert_eq!(curve[0]["bucket"], "Under $100");
    assert!(curve[0]["Buck Mason"].is_u64());

    let heatmap = json["data"]["heatmap"].as_array().expect("heatmap");
    assert_eq!(heatmap.len(), 16);
    assert_eq!(json["data"]["heatmap_scale"], 200);

    let volume = json["data"]["volume"].as_array().expect("volume");
    assert_eq!(json["data"]["market_leader"], volume[0]);
}

#[tokio::test]
async fn drilldown_defaults_to_dashboard_category() {
    let (app, _) = app_without_analyzer();
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/dashboard/comparison-category",
            &serde_json::json!({ "category": "Polos" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(
        app.oneshot(get("/api/v1/comparison/drilldown"))
            .await
            .expect("response"),
    )
    .await;
    assert_eq!(json["data"]["category"], "Polos");
    let rows = json["data"]["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 3);
    assert!(rows[0]["$1000+"].is_u64());
}

#[tokio::test]
async fn drilldown_rejects_unknown_category() {
    let (app, _) = app_without_analyzer();
    let response = app
        .oneshot(get("/api/v1/comparison/drilldown?category=Neckties"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refresh_without_api_key_is_unavailable() {
    let (app, state) = app_without_analyzer();
    let response = app
        .oneshot(post_json("/api/v1/dashboard/refresh", &serde_json::json!({})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(!state.dashboard.read().await.is_analyzing());
}

#[tokio::test]
async fn refresh_replaces_record_and_keeps_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(7)))
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = app_with_analyzer(&server.uri());
    let id = id_of(&state, "Buck Mason").await;

    let response = app
        .clone()
        .oneshot(post_json("/api/v1/dashboard/refresh", &serde_json::json!({})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["id"], id.as_str());
    assert_eq!(json["data"]["totalStyles"], 7);
    assert_eq!(json["data"]["sources"][0]["title"], "Polos");

    let detail = json_body(
        app.oneshot(get(&format!("/api/v1/brands/{id}")))
            .await
            .expect("response"),
    )
    .await;
    assert_eq!(detail["data"]["totalStyles"], 7);
    assert_eq!(detail["data"]["refresh"]["state"], "succeeded");

    let dashboard = state.dashboard.read().await;
    assert_eq!(dashboard.selected_id(), Some(id.as_str()));
    assert!(!dashboard.is_analyzing());
}

#[tokio::test]
async fn failed_refresh_keeps_previous_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (app, state) = app_with_analyzer(&server.uri());
    let id = id_of(&state, "Buck Mason").await;
    let before = state.dashboard.read().await.find(&id).cloned().expect("record");

    let response = app
        .oneshot(post_json("/api/v1/dashboard/refresh", &serde_json::json!({})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "upstream_error");

    let dashboard = state.dashboard.read().await;
    assert_eq!(dashboard.find(&id), Some(&before));
    assert!(matches!(
        dashboard.refresh_status(&id),
        Some(retailintel_core::RefreshStatus::Failed { .. })
    ));
    assert!(!dashboard.is_analyzing());
}

#[tokio::test]
async fn refresh_is_rejected_in_comparison_view() {
    let server = MockServer::start().await;
    let (app, _) = app_with_analyzer(&server.uri());

    app.clone()
        .oneshot(post_json(
            "/api/v1/dashboard/view",
            &serde_json::json!({ "view": "comparison" }),
        ))
        .await
        .expect("response");

    let response = app
        .oneshot(post_json("/api/v1/dashboard/refresh", &serde_json::json!({})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn concurrent_refresh_of_same_brand_conflicts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply(3))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = app_with_analyzer(&server.uri());

    let first = tokio::spawn(
        app.clone()
            .oneshot(post_json("/api/v1/dashboard/refresh", &serde_json::json!({}))),
    );

    // Wait until the first refresh holds the in-flight mark.
    for _ in 0..50 {
        if state.dashboard.read().await.is_analyzing() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(state.dashboard.read().await.is_analyzing());

    let second = app
        .oneshot(post_json("/api/v1/dashboard/refresh", &serde_json::json!({})))
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let first = first.await.expect("join").expect("response");
    assert_eq!(first.status(), StatusCode::OK);
    assert!(!state.dashboard.read().await.is_analyzing());
}

#[tokio::test]
async fn huge_counts_refresh_cleanly_and_allow_retry() {
    let text = serde_json::json!({
        "totalStyles": 8e9,
        "data": [
            { "category": "Polos", "counts": { "Under $100": 4e9, "$100 to $199": 4e9 } }
        ]
    })
    .to_string();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let (app, state) = app_with_analyzer(&server.uri());
    let id = id_of(&state, "Buck Mason").await;

    let first = app
        .clone()
        .oneshot(post_json("/api/v1/dashboard/refresh", &serde_json::json!({})))
        .await
        .expect("response");
    assert_eq!(first.status(), StatusCode::OK);
    let json = json_body(first).await;
    assert_eq!(json["data"]["totalStyles"], u64::from(u32::MAX));
    assert!(!state.dashboard.read().await.is_analyzing());

    let overview = json_body(
        app.clone()
            .oneshot(get("/api/v1/overview"))
            .await
            .expect("response"),
    )
    .await;
    assert_eq!(overview["data"]["summary"]["total_styles"], u64::from(u32::MAX));

    let second = app
        .oneshot(post_json("/api/v1/dashboard/refresh", &serde_json::json!({})))
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::OK);
    assert!(!state.dashboard.read().await.is_refreshing(&id));
}
