// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding model handle
//!
//! The HTTP layer only ever talks to [`EmbeddingModel`]. The production
//! implementation is [`OnnxEmbeddingModel`]; tests plug in stubs.

pub mod loader;
pub mod onnx_model;

pub use loader::{load_model, resolve_repo_id, ModelFiles};
pub use onnx_model::OnnxEmbeddingModel;

use anyhow::Result;
use async_trait::async_trait;

/// Default model, resolved against the sentence-transformers organisation
pub const DEFAULT_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// A loaded, read-only text embedding model.
///
/// Implementations must be safe to call from several requests at once,
/// serialising internally if the underlying runtime needs it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embeds a single text into a vector of `dimension()` floats
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector returned by `embed`
    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}
