use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use rate_impact_engine::api::{self, AppState};
use rate_impact_engine::config::Config;

fn app() -> Router {
    let cfg = Config::default();
    api::router(AppState::new(cfg.clone()), &cfg)
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    let (status, _) = send(get("/api/v1/healthz")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn lists_reference_utilities() {
    let (status, body) = send(get("/api/v1/utilities")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 14);
    assert_eq!(body["metadata"]["total_count"], 14);
}

#[tokio::test]
async fn filters_utilities_by_market() {
    let (status, body) = send(get("/api/v1/utilities?market=ercot")).await;
    assert_eq!(status, StatusCode::OK);
    let profiles = body["data"].as_array().unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["id"], "ercot-texas");
}

#[tokio::test]
async fn unknown_utility_is_not_found() {
    let (status, body) = send(get("/api/v1/utilities/nowhere-electric")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn projects_trajectories_for_a_reference_utility() {
    let (status, body) = send(post(
        "/api/v1/trajectories",
        json!({ "utility_id": "georgia-power", "years": 12 }),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["trajectories"]["baseline"].as_array().unwrap().len(), 13);
    assert_eq!(data["summary"]["final_year"], 2037);
    assert!(data["summary"]["final_year_bills"]["unoptimized"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn trajectories_reject_unknown_utility() {
    let (status, _) = send(post(
        "/api/v1/trajectories",
        json!({ "utility_id": "nowhere-electric" }),
    ))
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn revenue_adequacy_for_the_default_utility() {
    let (status, body) = send(post(
        "/api/v1/revenue-adequacy",
        json!({ "capacity_mw": 1000.0, "load_factor": 0.8, "peak_coincidence": 1.0 }),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    let ratio = body["data"]["revenue_adequacy_ratio"].as_f64().unwrap();
    assert!(ratio.is_finite() && ratio >= 0.0);
}

#[tokio::test]
async fn revenue_adequacy_rejects_out_of_range_inputs() {
    let (status, body) = send(post(
        "/api/v1/revenue-adequacy",
        json!({ "capacity_mw": 1000.0, "load_factor": 1.5, "peak_coincidence": 1.0 }),
    ))
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "ValidationError");
}

#[tokio::test]
async fn capacity_price_rises_with_data_center_peak() {
    let (status, body) = send(post(
        "/api/v1/capacity-price",
        json!({ "utility_id": "dominion-virginia", "dc_peak_contribution_mw": 1500.0 }),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    let new_price = data["new_capacity_price"].as_f64().unwrap();
    assert!(new_price > data["old_capacity_price"].as_f64().unwrap());
    assert!(data["price_increase"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn capacity_price_uses_a_supplied_curve() {
    let (status, body) = send(post(
        "/api/v1/capacity-price",
        json!({
            "utility_id": "dominion-virginia",
            "dc_peak_contribution_mw": 0.0,
            "supply_curve": {
                "points": [
                    { "reserve_margin": 0.10, "price_multiplier": 2.0 },
                    { "reserve_margin": 0.20, "price_multiplier": 0.5 }
                ],
                "cost_of_new_entry": 100.0,
                "scarcity_margin": 0.12,
                "critical_margin": 0.08
            }
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    // Dominion sits at the 15% default margin, halfway along the curve
    let price = body["data"]["old_capacity_price"].as_f64().unwrap();
    assert!((price - 125.0).abs() < 1e-9);
}

#[tokio::test]
async fn capacity_price_rejects_a_rising_curve() {
    let (status, body) = send(post(
        "/api/v1/capacity-price",
        json!({
            "dc_peak_contribution_mw": 100.0,
            "supply_curve": {
                "points": [
                    { "reserve_margin": 0.10, "price_multiplier": 0.5 },
                    { "reserve_margin": 0.20, "price_multiplier": 2.0 }
                ],
                "cost_of_new_entry": 100.0,
                "scarcity_margin": 0.12,
                "critical_margin": 0.08
            }
        }),
    ))
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "ValidationError");
}
