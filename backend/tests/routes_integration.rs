//! HTTP round trips through the axum router.

#![cfg(feature = "http-server")]

mod support;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use m7box_stats::config::AppConfig;
use m7box_stats::db::repositories::LocalRepository;
use m7box_stats::http::{create_router, AppState};

use support::sample_records;

fn app() -> Router {
    create_router(AppState::new(
        Arc::new(LocalRepository::new()),
        &AppConfig::default(),
    ))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn upload(app: &Router) -> String {
    let (status, info) = call(
        app,
        "POST",
        "/v1/sessions",
        Some(json!({"name": "march", "records": sample_records()})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    info["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = call(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "connected");
}

#[tokio::test]
async fn test_upload_and_list() {
    let app = app();
    let id = upload(&app).await;

    let (status, body) = call(&app, "GET", "/v1/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["sessions"][0]["session_id"], id.as_str());
    assert_eq!(body["sessions"][0]["rows"], 10);

    let (status, body) = call(&app, "GET", &format!("/v1/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "march");
}

#[tokio::test]
async fn test_options() {
    let app = app();
    let id = upload(&app).await;

    let (status, body) = call(
        &app,
        "GET",
        &format!("/v1/sessions/{}/options?range=ODR", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["range"], "ODR");
    assert_eq!(body["instruments"], json!(["All", "NQ", "ES", "EURUSD"]));
    assert_eq!(body["m7box_time"]["min_label"], "09:30");
}

#[tokio::test]
async fn test_dashboard() {
    let app = app();
    let id = upload(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/v1/sessions/{}/dashboard", id),
        Some(json!({"instrument": {"mode": "equals", "values": "EURUSD"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // The 11:15 session sits on the observed confirmation-time maximum.
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["charts"].as_array().unwrap().len(), 4);
    assert_eq!(body["tiles"].as_array().unwrap().len(), 12);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/v1/sessions/{}/dashboard", id),
        Some(json!({
            "instrument": {"mode": "equals", "values": "EURUSD"},
            "box_size": null,
            "m7box_time": null,
            "dr_time": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 3);
}

#[tokio::test]
async fn test_dashboard_empty_subset_serializes_nan_as_null() {
    let app = app();
    let id = upload(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/v1/sessions/{}/dashboard", id),
        Some(json!({"instrument": {"mode": "equals", "values": "GC"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 0);
    let median = body["tiles"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["kind"] == "median")
        .unwrap();
    assert_eq!(median["value"], Value::Null);
    assert_eq!(median["display"], "n/a");
}

#[tokio::test]
async fn test_generic_distribution() {
    let app = app();
    let id = upload(&app).await;

    let request = json!({
        "bin_specs": [{
            "column": "ODR_M7Box_Max_Retracement_STD",
            "output": "ret_bins",
            "edges": {"kind": "dynamic", "width": 0.25}
        }],
        "predicates": [{
            "kind": "categorical",
            "column": "Instrument",
            "selection": {"mode": "equals", "values": "NQ"}
        }],
        "category_column": "ret_bins",
        "probes": [{
            "column": "ODR_M7Box_Max_Retracement_STD",
            "comparison": "at_most",
            "threshold": -1.0
        }],
        "median_columns": ["ODR_M7Box_Max_Retracement_STD"]
    });
    let (status, body) = call(
        &app,
        "POST",
        &format!("/v1/sessions/{}/distribution", id),
        Some(request),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"].as_array().unwrap().len(), 11);
    assert_eq!(body["total"], 4);
    assert_eq!(body["probabilities"][0]["probability"], 0.5);
}

#[tokio::test]
async fn test_unknown_filter_column_is_bad_request() {
    let app = app();
    let id = upload(&app).await;

    let request = json!({
        "predicates": [{
            "kind": "categorical",
            "column": "Session",
            "selection": {"mode": "equals", "values": "London"}
        }],
        "category_column": "Instrument"
    });
    let (status, body) = call(
        &app,
        "POST",
        &format!("/v1/sessions/{}/distribution", id),
        Some(request),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_COLUMN");
    assert_eq!(body["details"], "column=Session");
}

#[tokio::test]
async fn test_occurrences() {
    let app = app();
    let id = upload(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/v1/sessions/{}/occurrences", id),
        Some(json!({"day_of_week": {"mode": "equals", "values": "Monday"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["columns"], json!(["Instrument", "Date", "Day of Week", "contract"]));
    // The other Monday confirmed at the 11:15 maximum.
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
    assert_eq!(body["rows"][0]["Date"], "2024-03-04");
}

#[tokio::test]
async fn test_replace_and_close_session() {
    let app = app();
    let id = upload(&app).await;

    let records: Vec<Value> = sample_records().into_iter().take(3).collect();
    let (status, body) = call(
        &app,
        "PUT",
        &format!("/v1/sessions/{}/dataset", id),
        Some(json!({"records": records})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], 3);

    let (status, _) = call(&app, "DELETE", &format!("/v1/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/v1/sessions/{}/dashboard", id),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_upload_is_bad_request() {
    let (status, body) = call(
        &app(),
        "POST",
        "/v1/sessions",
        Some(json!({"records": ["not an object"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
