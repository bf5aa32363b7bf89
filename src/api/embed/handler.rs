// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed HTTP handler
//!
//! Validates the body, runs the shared model on the text and returns the
//! vector. Validation failures never reach the model; inference failures
//! are reported to the caller and the server keeps running.

use crate::api::embed::{EmbedRequest, EmbedResponse};
use crate::api::http_server::AppState;
use crate::api::ApiError;
use crate::embeddings::EmbeddingModel;
use axum::{body::Bytes, extract::rejection::BytesRejection, extract::State, Json};
use tracing::{error, info, warn};

/// Runs one embedding request against `model`.
///
/// Returns [`ApiError::NoTextProvided`] without calling the model if the
/// request is invalid, and [`ApiError::Inference`] if the model fails or
/// hands back a vector of the wrong length or with non-finite values.
pub async fn embed_text(
    model: &dyn EmbeddingModel,
    request: &EmbedRequest,
) -> Result<EmbedResponse, ApiError> {
    if let Err(e) = request.validate() {
        warn!("Rejected embed request: {}", e);
        return Err(e);
    }

    let embedding = model.embed(&request.text).await.map_err(|e| {
        error!("Embedding failed for {}-byte input: {:#}", request.text.len(), e);
        ApiError::Inference(format!("{:#}", e))
    })?;

    if embedding.len() != model.dimension() {
        error!(
            "Model {} returned {} dimensions (expected {})",
            model.model_name(),
            embedding.len(),
            model.dimension()
        );
        return Err(ApiError::Inference(format!(
            "embedding has {} dimensions, expected {}",
            embedding.len(),
            model.dimension()
        )));
    }

    if let Some(index) = embedding.iter().position(|v| !v.is_finite()) {
        error!("Model {} returned a non-finite value at index {}", model.model_name(), index);
        return Err(ApiError::Inference(format!(
            "embedding contains a non-finite value at index {}",
            index
        )));
    }

    info!(
        "Generated {}-dimensional embedding for {}-byte input",
        embedding.len(),
        request.text.len()
    );
    Ok(EmbedResponse { embedding })
}

/// POST /embed handler
///
/// # Request Body
/// ```json
/// { "text": "hello world" }
/// ```
///
/// # Responses
/// - 200 `{"embedding": [...]}`
/// - 400 `{"error": "No text provided"}`
/// - 413 `{"error": "Request body too large"}`
/// - 500 `{"error": "Internal server error: <message>"}`
pub async fn embed_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<EmbedResponse>, ApiError> {
    let body = body.map_err(|rejection| {
        warn!("Could not read embed request body: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    let request = EmbedRequest::from_slice(&body).map_err(|e| {
        warn!("Rejected embed request ({} body bytes): {}", body.len(), e);
        e
    })?;

    embed_text(state.model.as_ref(), &request).await.map(Json)
}
