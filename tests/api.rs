//! HTTP API tests driving the router in-process

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use indeptax::api::{app, AppState};
use indeptax::core::rates::RateTable;
use indeptax::store::{JsonFileStore, MemoryStore, Store};
use indeptax::tax::CalculationContext;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> axum::Router {
    app(AppState::new(
        RateTable::builtin(2024).unwrap(),
        CalculationContext::new(2024),
        Arc::new(MemoryStore::new()),
    ))
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn period() -> Value {
    json!({
        "transactions": [
            { "id": "inv-1", "date": "2024-01-15", "gross": "1210", "vatRate": 21 }
        ],
        "userInfo": { "status": "Principal", "activityStartYear": 2024 }
    })
}

#[tokio::test]
async fn health() {
    let response = test_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn summary_returns_totals() {
    let response = test_app()
        .oneshot(post_json("/summary", &period()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let totals = &body["totals"];
    assert_eq!(totals["vat"], "210.00");
    assert_eq!(totals["socialContributions"], "785.34");
    assert_eq!(totals["incomeTax"], "53.66");
    assert!(body.get("warnings").is_none());
}

#[tokio::test]
async fn summary_missing_user_info_is_400() {
    let body = json!({ "transactions": [] });
    let response = test_app()
        .oneshot(post_json("/summary", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "Invalid input" }));
}

#[tokio::test]
async fn summary_null_transactions_is_400() {
    let body = json!({ "transactions": null, "userInfo": { "activityStartYear": 2024 } });
    let response = test_app()
        .oneshot(post_json("/summary", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn summary_malformed_body_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/summary")
        .body(Body::from("not json"))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn summary_validation_failure_is_422() {
    let mut body = period();
    body["transactions"][0]["gross"] = json!("-10");
    let response = test_app()
        .oneshot(post_json("/summary", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error = body_json(response).await;
    assert!(error["error"].as_str().unwrap().contains("negative"));
}

#[tokio::test]
async fn summary_future_start_is_422() {
    let mut body = period();
    body["userInfo"]["activityStartYear"] = json!(2030);
    let response = test_app()
        .oneshot(post_json("/summary", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn summary_year_is_only_echoed() {
    let mut body = period();
    body["transactions"][0]["gross"] = json!("60500");
    let response = test_app()
        .oneshot(post_json("/summary", &body))
        .await
        .unwrap();
    let without_year = body_json(response).await;
    assert_eq!(without_year["totals"]["socialContributions"], "7238.00");
    assert!(without_year.get("year").is_none());

    body["year"] = json!(2028);
    let response = test_app()
        .oneshot(post_json("/summary", &body))
        .await
        .unwrap();
    let with_year = body_json(response).await;
    assert_eq!(with_year["year"], 2028);
    assert_eq!(with_year["totals"], without_year["totals"]);
}

#[tokio::test]
async fn summary_oversized_amounts_are_422() {
    let huge = "79228162514264337593543950335";
    let mut body = period();
    body["transactions"] = json!([
        { "id": "a", "date": "2024-01-15", "gross": huge },
        { "id": "b", "date": "2024-01-16", "gross": huge }
    ]);
    let response = test_app()
        .oneshot(post_json("/summary", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error = body_json(response).await;
    assert!(error["error"].as_str().unwrap().contains("exceeds"));
}

#[tokio::test]
async fn summary_extreme_start_year_is_422() {
    let mut body = period();
    body["userInfo"]["activityStartYear"] = json!(i32::MIN);
    let response = test_app()
        .oneshot(post_json("/summary", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn summary_reports_warnings() {
    let mut body = period();
    body["transactions"][0]["vatRate"] = json!(19);
    let response = test_app()
        .oneshot(post_json("/summary", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["warnings"][0]["type"], "NonStandardVatRate");
}

#[tokio::test]
async fn summary_rejects_other_methods() {
    let response = test_app().oneshot(get("/summary")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn unknown_year_is_empty() {
    let response = test_app().oneshot(get("/data/2024")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({}));
}

#[tokio::test]
async fn save_then_load_fills_totals() {
    let app = test_app();
    let mut period = period();
    period["balances"] = json!({ "business": "1000" });
    let data = json!({ "2024-01": period });

    let response = app
        .clone()
        .oneshot(post_json("/data/2024", &data))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "message": "Data saved" }));

    let response = app.oneshot(get("/data/2024")).await.unwrap();
    let loaded = body_json(response).await;
    let stored = &loaded["2024-01"];
    assert_eq!(stored["transactions"][0]["id"], "inv-1");
    assert_eq!(stored["totals"]["vat"], "210.00");
    assert_eq!(stored["totals"]["socialContributions"], "785.34");
}

#[tokio::test]
async fn save_invalid_data_is_422() {
    let data = json!({ "2024-01": { "transactions": [], "userInfo": { "activityStartYear": "soon" } } });
    let response = test_app()
        .oneshot(post_json("/data/2024", &data))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn save_extreme_start_year_is_422() {
    let mut period = period();
    period["userInfo"]["activityStartYear"] = json!(i32::MIN);
    let response = test_app()
        .oneshot(post_json("/data/2024", &json!({ "2024-01": period })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn data_persists_in_file_store() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path()));
    let app = app(AppState::new(
        RateTable::builtin(2024).unwrap(),
        CalculationContext::new(2024),
        store.clone(),
    ));

    let response = app
        .oneshot(post_json("/data/2025", &json!({ "March": period() })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let saved = store.load(2025).unwrap();
    assert_eq!(saved.len(), 1);
    assert!(saved.get("March").unwrap().totals.is_some());
    assert!(dir.path().join("treasury-2025.json").exists());
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn transactions_add_list_remove() {
    let app = test_app();
    let response = app.clone().oneshot(get("/transactions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));

    let input = json!({ "id": "inv-7", "date": "2024-02-01", "gross": "121", "vatRate": 21 });
    let response = app
        .clone()
        .oneshot(post_json("/transactions", &input))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["id"], "inv-7");
    let amount = |field: &str| created[field].as_str().unwrap().parse::<Decimal>().unwrap();
    assert_eq!(amount("net"), Decimal::from(100));
    assert_eq!(amount("vat"), Decimal::from(21));

    let response = app.clone().oneshot(get("/transactions")).await.unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], "inv-7");

    let response = app
        .clone()
        .oneshot(delete("/transactions?id=inv-7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get("/transactions")).await.unwrap();
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn transactions_invalid_amount_is_422() {
    let input = json!({ "id": "x", "date": "2024-02-01", "gross": "-1" });
    let response = test_app()
        .oneshot(post_json("/transactions", &input))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn transactions_duplicate_id_is_422() {
    let app = test_app();
    let input = json!({ "id": "dup", "date": "2024-02-01", "gross": "50" });
    let response = app
        .clone()
        .oneshot(post_json("/transactions", &input))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(post_json("/transactions", &input))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn transactions_malformed_body_is_400() {
    let input = json!({ "date": "2024-02-01" });
    let response = test_app()
        .oneshot(post_json("/transactions", &input))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transactions_remove_unknown_id_is_204() {
    let response = test_app()
        .oneshot(delete("/transactions?id=nope"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn transactions_remove_without_id_is_400() {
    let response = test_app().oneshot(delete("/transactions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transactions_other_methods_are_405() {
    let request = Request::builder()
        .method("PUT")
        .uri("/transactions")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
