// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding API Module
//!
//! POST /embed: one text in, one vector out.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{embed_handler, embed_text};
pub use request::EmbedRequest;
pub use response::{EmbedResponse, TestEmbedResponse};
