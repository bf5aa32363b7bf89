// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Index, health, self-test and fallback route tests

use super::stub_model::{as_vector, app_with, post_embed, send, StubModel, STUB_DIMENSION};
use axum::http::{Method, StatusCode};
use serde_json::json;

const TEST_SENTENCE: &str = "This is a test sentence for embedding.";

#[tokio::test]
async fn test_index_returns_welcome_message() {
    let (status, body) = send(app_with(StubModel::new()), Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Welcome to the embedding service"}));
}

#[tokio::test]
async fn test_health_ok_regardless_of_history() {
    let model = StubModel::failing_on("boom");
    let app = app_with(model.clone());

    let (status, body) = send(app.clone(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    // A failed inference and a rejected request must not affect health
    post_embed(app.clone(), r#"{"text": "boom"}"#).await;
    post_embed(app.clone(), "{}").await;

    let (status, body) = send(app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_self_test_matches_direct_embed() {
    let app = app_with(StubModel::new());

    let (status, self_test) = send(app.clone(), Method::GET, "/test-embed", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(self_test["test_text"], TEST_SENTENCE);

    let body = json!({ "text": TEST_SENTENCE }).to_string();
    let (status, direct) = post_embed(app, &body).await;
    assert_eq!(status, StatusCode::OK);

    let self_test_vec = as_vector(&self_test["embedding"]);
    assert_eq!(self_test_vec.len(), STUB_DIMENSION);
    assert_eq!(self_test_vec, as_vector(&direct["embedding"]));
}

#[tokio::test]
async fn test_self_test_reports_model_failure() {
    let app = app_with(StubModel::failing_on("test sentence"));

    let (status, body) = send(app, Method::GET, "/test-embed", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Internal server error: "));
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let (status, body) = send(app_with(StubModel::new()), Method::GET, "/v1/embed", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Not found"}));
}

#[tokio::test]
async fn test_wrong_method_on_get_routes_returns_json_405() {
    for uri in ["/", "/health", "/test-embed"] {
        let (status, body) = send(app_with(StubModel::new()), Method::POST, uri, Some("{}")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "uri: {}", uri);
        assert_eq!(body, json!({"error": "Method not allowed"}));
    }
}
