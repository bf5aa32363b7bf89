// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the embedding service

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Full version string with feature description
pub const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"), "-onnx-embeddings");

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "onnx-runtime",
    "sentence-embeddings",
    "hf-hub-download",
    "self-test-endpoint",
];

pub fn get_version_string() -> String {
    format!("Embedding Service {}", VERSION)
}
