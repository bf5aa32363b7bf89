// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service configuration
//!
//! Every option is a command line flag with an environment variable
//! fallback. `main` loads a `.env` file first, so the same variables can
//! live there.

use crate::embeddings::DEFAULT_MODEL_NAME;
use anyhow::{anyhow, Result};
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 256;
pub const DEFAULT_INTRA_THREADS: usize = 4;

/// Embedding service configuration
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "embedding-service")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "HTTP service that turns text into sentence embeddings", long_about = None)]
pub struct ServiceConfig {
    /// Address to listen on
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Model name; bare names resolve to sentence-transformers/<name>
    #[arg(long, env = "MODEL_NAME", default_value = DEFAULT_MODEL_NAME)]
    pub model_name: String,

    /// Local directory holding model.onnx and tokenizer.json
    #[arg(long, env = "MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// HuggingFace Hub cache directory
    #[arg(long, env = "HF_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Fail startup unless the model produces vectors of this length
    #[arg(long, env = "EMBEDDING_DIMENSION")]
    pub expected_dimension: Option<usize>,

    /// Inputs longer than this many tokens are truncated
    #[arg(long, env = "MAX_SEQUENCE_LENGTH", default_value_t = DEFAULT_MAX_SEQUENCE_LENGTH)]
    pub max_sequence_length: usize,

    /// ONNX Runtime intra-op thread count
    #[arg(long, env = "ONNX_INTRA_THREADS", default_value_t = DEFAULT_INTRA_THREADS)]
    pub intra_threads: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_dir: None,
            cache_dir: None,
            expected_dimension: None,
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
            intra_threads: DEFAULT_INTRA_THREADS,
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("port must be greater than 0"));
        }
        if self.model_name.trim().is_empty() {
            return Err(anyhow!("model name cannot be empty"));
        }
        if self.max_sequence_length == 0 {
            return Err(anyhow!("max sequence length must be greater than 0"));
        }
        if self.intra_threads == 0 {
            return Err(anyhow!("intra-op thread count must be greater than 0"));
        }
        if self.expected_dimension == Some(0) {
            return Err(anyhow!("expected dimension must be greater than 0"));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
