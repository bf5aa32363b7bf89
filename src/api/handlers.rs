// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::embed::{embed_text, EmbedRequest, TestEmbedResponse};
use crate::api::http_server::AppState;
use crate::api::ApiError;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Sentence embedded by GET /test-embed
pub const TEST_SENTENCE: &str = "This is a test sentence for embedding.";

pub const WELCOME_MESSAGE: &str = "Welcome to the embedding service";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

pub async fn index_handler() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

/// Liveness probe. Once the server is listening the model is loaded, so
/// this always reports ok.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Smoke test: embeds [`TEST_SENTENCE`] without needing a client payload
pub async fn test_embed_handler(
    State(state): State<AppState>,
) -> Result<Json<TestEmbedResponse>, ApiError> {
    info!("Running self-test embedding");
    let request = EmbedRequest::new(TEST_SENTENCE);
    let response = embed_text(state.model.as_ref(), &request).await?;

    Ok(Json(TestEmbedResponse {
        test_text: request.text,
        embedding: response.embedding,
    }))
}

/// Catch-all so unknown routes still get a JSON body
pub async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}

/// Known route, wrong method
pub async fn method_not_allowed_handler() -> ApiError {
    ApiError::MethodNotAllowed
}
