// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Model tests against the real all-MiniLM-L6-v2 export
//!
//! Ignored by default. Point MODEL_DIR at a directory with model.onnx (or
//! onnx/model.onnx) and tokenizer.json, then run with `--ignored`.

use axum::http::StatusCode;
use embedding_service::api::{create_app, AppState};
use embedding_service::config::ServiceConfig;
use embedding_service::embeddings::{load_model, EmbeddingModel, ModelFiles, OnnxEmbeddingModel};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

fn model_dir() -> PathBuf {
    PathBuf::from(
        std::env::var("MODEL_DIR").unwrap_or_else(|_| "./models/all-MiniLM-L6-v2".to_string()),
    )
}

fn load() -> OnnxEmbeddingModel {
    let files = ModelFiles::from_dir(&model_dir()).expect("MODEL_DIR must contain model files");
    OnnxEmbeddingModel::new("all-MiniLM-L6-v2", files.model_path, files.tokenizer_path, 256, 2)
        .expect("Failed to load model")
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_model_reports_384_dimensions() {
    let model = load();
    assert_eq!(model.dimension(), 384);
    assert_eq!(model.model_name(), "all-MiniLM-L6-v2");
    assert_eq!(model.max_length(), 256);
}

#[tokio::test]
#[ignore]
async fn test_embedding_is_normalized_and_finite() {
    let model = load();
    let embedding = model.embed("hello world").await.unwrap();

    assert_eq!(embedding.len(), 384);
    assert!(embedding.iter().all(|v| v.is_finite()));
    let magnitude = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((magnitude - 1.0).abs() < 1e-3, "magnitude {}", magnitude);
}

#[tokio::test]
#[ignore]
async fn test_embedding_is_deterministic() {
    let model = load();
    let first = model.embed("determinism check").await.unwrap();
    let second = model.embed("determinism check").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
#[ignore]
async fn test_semantic_similarity_ordering() {
    let model = load();
    let cat = model.embed("A cat sits on the mat").await.unwrap();
    let kitten = model.embed("A kitten is resting on a rug").await.unwrap();
    let finance = model.embed("Quarterly revenue exceeded forecasts").await.unwrap();

    assert!(cosine(&cat, &kitten) > cosine(&cat, &finance));
}

#[tokio::test]
#[ignore]
async fn test_long_input_is_truncated() {
    let model = load();
    let very_long_text = "word ".repeat(10_000);
    let embedding = model.embed(&very_long_text).await.unwrap();
    assert_eq!(embedding.len(), 384);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_calls_share_session() {
    let model = Arc::new(load());
    let mut handles = Vec::new();
    for i in 0..8 {
        let model = model.clone();
        handles.push(tokio::spawn(async move {
            model.embed(&format!("concurrent text {}", i)).await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().len(), 384);
    }
}

#[tokio::test]
#[ignore]
async fn test_loader_and_endpoint_end_to_end() {
    let config = ServiceConfig {
        model_dir: Some(model_dir()),
        expected_dimension: Some(384),
        ..ServiceConfig::default()
    };
    let model = load_model(&config).await.unwrap();
    let app = create_app(AppState::new(model));

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/embed")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(r#"{"text": "hello world"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body["embedding"].as_array().unwrap().len(), 384);
}

#[tokio::test]
#[ignore]
async fn test_loader_rejects_dimension_mismatch() {
    let config = ServiceConfig {
        model_dir: Some(model_dir()),
        expected_dimension: Some(768),
        ..ServiceConfig::default()
    };
    let err = load_model(&config).await.err().expect("load should fail");
    assert!(err.to_string().contains("dimension mismatch"), "{}", err);
}
