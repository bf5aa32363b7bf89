// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! Runs a sentence transformer export (all-MiniLM-L6-v2 by default) on
//! ONNX Runtime.
//!
//! Pipeline:
//! - BERT tokenization with truncation to `max_length`
//! - ONNX inference producing token states `[batch, seq_len, hidden_dim]`
//! - Mean pooling weighted by the attention mask
//! - L2 normalization

use super::EmbeddingModel;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ndarray::{Array2, ArrayView2, Axis};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

/// ONNX-based sentence embedding model
///
/// # Thread Safety
/// `Session::run` needs exclusive access, so the session lives behind a
/// mutex and concurrent requests take turns. Tokenization and pooling run
/// outside the lock. Cloning is cheap (all fields are shared).
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    /// Discovered from the validation inference at load time
    dimension: usize,
    max_length: usize,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("max_length", &self.max_length)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Loads the model and tokenizer from disk and validates them with a
    /// test inference.
    ///
    /// # Errors
    /// Returns error if:
    /// - Model or tokenizer file is missing or invalid
    /// - ONNX Runtime initialization fails
    /// - The model does not produce `[batch, seq_len, hidden_dim]` output
    ///
    /// # Example
    /// ```ignore
    /// let model = OnnxEmbeddingModel::new(
    ///     "all-MiniLM-L6-v2",
    ///     "./models/all-MiniLM-L6-v2/model.onnx",
    ///     "./models/all-MiniLM-L6-v2/tokenizer.json",
    ///     256,
    ///     4,
    /// )?;
    /// ```
    pub fn new<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
        max_length: usize,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        info!(
            "Initializing ONNX session for {} ({} intra-op threads)",
            model_name, intra_threads
        );
        let mut session = Session::builder()
            .context("Failed to create session builder")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
        tokenizer.with_padding(None);

        let dimension = {
            let (input_ids, attention_mask, token_type_ids) =
                encode_inputs(&tokenizer, "validation test")?;
            let outputs = session.run(ort::inputs![
                "input_ids" => Value::from_array(input_ids)?,
                "attention_mask" => Value::from_array(attention_mask)?,
                "token_type_ids" => Value::from_array(token_type_ids)?
            ])?;
            let output_tensor = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?;
            let shape = output_tensor.shape();
            if shape.len() != 3 || shape[2] == 0 {
                anyhow::bail!(
                    "Model outputs unexpected dimensions: {:?} (expected [batch, seq_len, hidden_dim])",
                    shape
                );
            }
            shape[2]
        };

        info!("ONNX embedding model {} loaded ({} dimensions)", model_name, dimension);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            dimension,
            max_length,
        })
    }

    /// Synchronous inference. Blocks the calling thread for the full
    /// duration of the ONNX run.
    pub fn embed_blocking(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask, token_type_ids) = encode_inputs(&self.tokenizer, text)?;
        let mask: Vec<f32> = attention_mask.iter().map(|&m| m as f32).collect();

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("ONNX session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids)?,
            "attention_mask" => Value::from_array(attention_mask)?,
            "token_type_ids" => Value::from_array(token_type_ids)?
        ])?;

        // Index [0] rather than a name: exports disagree on the output name
        let output_array = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;
        if output_array.ndim() != 3 {
            anyhow::bail!("Unexpected output rank: {:?}", output_array.shape());
        }
        let token_states = output_array
            .index_axis(Axis(0), 0)
            .into_dimensionality::<ndarray::Ix2>()
            .context("Failed to view token states")?;

        let mut embedding = mean_pool(token_states, &mask);
        l2_normalize(&mut embedding);

        if embedding.len() != self.dimension {
            anyhow::bail!(
                "Unexpected embedding dimension: {} (expected {})",
                embedding.len(),
                self.dimension
            );
        }

        debug!("Embedded {} tokens", mask.len());
        Ok(embedding)
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

#[async_trait]
impl EmbeddingModel for OnnxEmbeddingModel {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = self.clone();
        let text = text.to_owned();
        tokio::task::spawn_blocking(move || model.embed_blocking(&text))
            .await
            .context("Inference task failed")?
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Tokenizes `text` into the three `[1, seq_len]` tensors BERT exports expect
fn encode_inputs(
    tokenizer: &Tokenizer,
    text: &str,
) -> Result<(Array2<i64>, Array2<i64>, Array2<i64>)> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

    let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
    let attention_mask: Vec<i64> = encoding
        .get_attention_mask()
        .iter()
        .map(|&m| m as i64)
        .collect();
    let token_type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&t| t as i64).collect();
    let seq_len = input_ids.len();

    Ok((
        Array2::from_shape_vec((1, seq_len), input_ids)
            .context("Failed to create input_ids array")?,
        Array2::from_shape_vec((1, seq_len), attention_mask)
            .context("Failed to create attention_mask array")?,
        Array2::from_shape_vec((1, seq_len), token_type_ids)
            .context("Failed to create token_type_ids array")?,
    ))
}

/// Mean pooling over the sequence axis, ignoring masked-out tokens
fn mean_pool(token_states: ArrayView2<'_, f32>, mask: &[f32]) -> Vec<f32> {
    let hidden_dim = token_states.shape()[1];
    let mut pooled = vec![0.0f32; hidden_dim];
    let mut sum_mask = 0.0f32;

    for (row, &mask_value) in token_states.outer_iter().zip(mask) {
        sum_mask += mask_value;
        for (acc, &value) in pooled.iter_mut().zip(row.iter()) {
            *acc += value * mask_value;
        }
    }

    for val in &mut pooled {
        *val /= sum_mask.max(1e-9);
    }
    pooled
}

fn l2_normalize(values: &mut [f32]) {
    let norm = values.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in values.iter_mut() {
            *value /= norm;
        }
    }
}
