mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use health_analytics::api::rest::error::APPLICATION_PROBLEM_JSON;

use common::{module_at, new_store};

fn app() -> Router {
    module_at(&new_store(), "2024-01-05T10:00:00Z").router()
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn crud_over_http() {
    let app = app();

    let (status, created) = send(
        &app,
        request(
            Method::POST,
            "/v1/medical_records",
            Some(json!({"user_id": "u1", "record_type": "lab", "doctor_id": "d1"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, record) = send(&app, request(Method::GET, &format!("/v1/medical_records/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["record_type"], "lab");
    assert_eq!(record["created_at"], "2024-01-05T10:00:00Z");

    // Path id wins over a conflicting body id.
    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            &format!("/v1/medical_records/{id}"),
            Some(json!({"id": "65a0f0f0f0f0f0f0f0f0f0f0", "description": "fasting"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, record) = send(&app, request(Method::GET, &format!("/v1/medical_records/{id}"), None)).await;
    assert_eq!(record["description"], "fasting");
    assert_eq!(record["doctor_id"], "d1");

    let (status, list) = send(&app, request(Method::GET, "/v1/medical_records?user_id=u1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);

    let (status, _) = send(&app, request(Method::DELETE, &format!("/v1/medical_records/{id}"), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, problem) = send(&app, request(Method::GET, &format!("/v1/medical_records/{id}"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(problem["status"], 404);
    assert_eq!(problem["code"], "NOT_FOUND");
    assert_eq!(problem["instance"], format!("/v1/medical_records/{id}"));
}

#[tokio::test]
async fn errors_are_problem_json() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(request(Method::GET, "/v1/genetic_data/not-an-id", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let ct = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert_eq!(ct, APPLICATION_PROBLEM_JSON);

    let (status, problem) = send(
        &app,
        request(Method::PUT, "/v1/genetic_data/not-an-id", Some(json!({"data_type": "DNA"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["code"], "INVALID_IDENTITY");

    let body = json!({"id": "65a0f0f0f0f0f0f0f0f0f0f0", "user_id": "u1"});
    let (status, _) = send(&app, request(Method::POST, "/v1/genetic_data", Some(body.clone()))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, problem) = send(&app, request(Method::POST, "/v1/genetic_data", Some(body))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(problem["code"], "ALREADY_EXISTS");

    let (status, problem) = send(
        &app,
        request(Method::POST, "/v1/wearable_data", Some(json!({"user_id": 42}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["code"], "INVALID_BODY");
}

#[tokio::test]
async fn store_outage_is_service_unavailable() {
    let store = new_store();
    let app = module_at(&store, "2024-01-05T10:00:00Z").router();
    store.set_offline(true);

    let (status, problem) = send(&app, request(Method::GET, "/v1/lifestyle_data", None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(problem["code"], "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn summaries_over_http() {
    let app = app();

    send(
        &app,
        request(Method::POST, "/v1/health_recommendations", Some(json!({"user_id": "u1", "priority": 2}))),
    )
    .await;

    let (status, day) = send(
        &app,
        request(Method::GET, "/v1/summaries/daily?user_id=u1&date=2024-01-05", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["health_recommendations"].as_array().unwrap().len(), 1);
    assert_eq!(day["genetic_data"].as_array().unwrap().len(), 0);

    let (status, problem) = send(
        &app,
        request(
            Method::GET,
            "/v1/summaries/weekly?user_id=u1&start_date=2024-01-07&end_date=2024-01-01",
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["code"], "INVALID_DATE_RANGE");

    let (status, problem) = send(&app, request(Method::GET, "/v1/summaries/daily?user_id=u1", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["code"], "INVALID_QUERY");
}

#[tokio::test]
async fn list_filters_by_numeric_priority() {
    let app = app();
    for p in [1, 4] {
        send(
            &app,
            request(Method::POST, "/v1/health_recommendations", Some(json!({"user_id": "u1", "priority": p}))),
        )
        .await;
    }
    let (status, list) = send(&app, request(Method::GET, "/v1/health_recommendations?priority=4", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["items"][0]["priority"], 4);
}

#[tokio::test]
async fn request_id_is_generated_or_propagated() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(request(Method::GET, "/health", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let generated = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(!generated.is_empty(), "x-request-id should be generated");

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("abc-123")
    );
}
