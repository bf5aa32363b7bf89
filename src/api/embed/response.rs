// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Response bodies for the embedding endpoints

use serde::{Deserialize, Serialize};

/// Response body for POST /embed
///
/// # Example
/// ```json
/// { "embedding": [0.1, 0.2, ...] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedResponse {
    pub embedding: Vec<f32>,
}

impl EmbedResponse {
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

/// Response body for GET /test-embed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestEmbedResponse {
    pub test_text: String,
    pub embedding: Vec<f32>,
}
