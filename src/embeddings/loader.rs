// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model Loader
//!
//! Turns a model name into a ready [`EmbeddingModel`]. Files come from a
//! local directory when one is configured and complete, otherwise from the
//! HuggingFace Hub. Any failure here is fatal to the process: there is no
//! retry and no degraded mode.

use super::{EmbeddingModel, OnnxEmbeddingModel};
use crate::config::ServiceConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Organisation that bare model names resolve against
const DEFAULT_ORG: &str = "sentence-transformers";

const HUB_MODEL_FILE: &str = "onnx/model.onnx";
const TOKENIZER_FILE: &str = "tokenizer.json";

/// Paths of the two files a model needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

impl ModelFiles {
    /// Looks for `model.onnx` (or `onnx/model.onnx`) and `tokenizer.json`
    /// inside `dir`. Returns `None` unless both are present.
    pub fn from_dir(dir: &Path) -> Option<Self> {
        let tokenizer_path = dir.join(TOKENIZER_FILE);
        if !tokenizer_path.is_file() {
            return None;
        }

        [dir.join("model.onnx"), dir.join(HUB_MODEL_FILE)]
            .into_iter()
            .find(|p| p.is_file())
            .map(|model_path| Self {
                model_path,
                tokenizer_path,
            })
    }
}

/// Maps a model name to a Hub repository id.
///
/// `all-MiniLM-L6-v2` becomes `sentence-transformers/all-MiniLM-L6-v2`;
/// names that already contain an owner are returned unchanged.
pub fn resolve_repo_id(model_name: &str) -> String {
    if model_name.contains('/') {
        model_name.to_string()
    } else {
        format!("{}/{}", DEFAULT_ORG, model_name)
    }
}

async fn fetch_from_hub(repo_id: &str, cache_dir: Option<&Path>) -> Result<ModelFiles> {
    let mut builder = hf_hub::api::tokio::ApiBuilder::new().with_progress(false);
    if let Some(dir) = cache_dir {
        builder = builder.with_cache_dir(dir.to_path_buf());
    }
    let api = builder.build().context("Failed to create HuggingFace Hub client")?;
    let repo = api.model(repo_id.to_string());

    info!("Fetching {} from HuggingFace Hub", repo_id);
    let model_path = repo
        .get(HUB_MODEL_FILE)
        .await
        .with_context(|| format!("Failed to download {} from {}", HUB_MODEL_FILE, repo_id))?;
    let tokenizer_path = repo
        .get(TOKENIZER_FILE)
        .await
        .with_context(|| format!("Failed to download {} from {}", TOKENIZER_FILE, repo_id))?;

    Ok(ModelFiles {
        model_path,
        tokenizer_path,
    })
}

/// Checks the configured model directory, warning when it is incomplete
fn local_model_files(dir: &Path) -> Option<ModelFiles> {
    match ModelFiles::from_dir(dir) {
        Some(files) => {
            info!("Using local model files from {}", dir.display());
            Some(files)
        }
        None => {
            warn!(
                "MODEL_DIR {} has no complete model files, falling back to the Hub",
                dir.display()
            );
            None
        }
    }
}

/// Locates the model files for `config`, downloading them if needed
pub async fn resolve_model_files(config: &ServiceConfig) -> Result<ModelFiles> {
    if let Some(files) = config.model_dir.as_deref().and_then(local_model_files) {
        return Ok(files);
    }

    fetch_from_hub(&resolve_repo_id(&config.model_name), config.cache_dir.as_deref()).await
}

/// Loads the process-wide model handle.
///
/// Logs and returns the error on failure; the caller is expected to abort
/// startup.
pub async fn load_model(config: &ServiceConfig) -> Result<Arc<dyn EmbeddingModel>> {
    info!("Loading embedding model: {}", config.model_name);

    match try_load(config).await {
        Ok(model) => {
            info!(
                "✓ Embedding model ready: {} ({} dimensions)",
                model.model_name(),
                model.dimension()
            );
            Ok(model)
        }
        Err(e) => {
            error!("✗ Failed to load embedding model {}: {:#}", config.model_name, e);
            Err(e)
        }
    }
}

async fn try_load(config: &ServiceConfig) -> Result<Arc<dyn EmbeddingModel>> {
    let files = resolve_model_files(config).await?;

    let name = config.model_name.clone();
    let max_length = config.max_sequence_length;
    let intra_threads = config.intra_threads;
    // Session creation runs a test inference, keep it off the async workers
    let model = tokio::task::spawn_blocking(move || {
        OnnxEmbeddingModel::new(
            name,
            files.model_path,
            files.tokenizer_path,
            max_length,
            intra_threads,
        )
    })
    .await
    .context("Model loading task failed")??;

    if let Some(expected) = config.expected_dimension {
        if model.dimension() != expected {
            anyhow::bail!(
                "Model {} dimension mismatch: expected {}, got {}",
                config.model_name,
                expected,
                model.dimension()
            );
        }
    }

    Ok(Arc::new(model))
}
