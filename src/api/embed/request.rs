// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedRequest type for POST /embed
//!
//! The body is checked against the schema before anything touches the
//! model. Every mismatch fails closed with [`ApiError::NoTextProvided`].

use crate::api::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for POST /embed
///
/// # Example
/// ```json
/// { "text": "Hello world" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedRequest {
    pub text: String,
}

impl EmbedRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Builds a request from an arbitrary JSON body.
    ///
    /// Rejects non-objects, a missing `text`, a non-string `text`, and
    /// empty text. Whitespace-only text is embedded like any other.
    pub fn from_json(body: &Value) -> Result<Self, ApiError> {
        let text = body
            .as_object()
            .and_then(|obj| obj.get("text"))
            .and_then(Value::as_str)
            .ok_or(ApiError::NoTextProvided)?;

        let request = Self::new(text);
        request.validate()?;
        Ok(request)
    }

    /// Parses and validates raw body bytes
    pub fn from_slice(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::NoTextProvided)?;
        Self::from_json(&value)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.text.is_empty() {
            return Err(ApiError::NoTextProvided);
        }
        Ok(())
    }
}
