// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod embed;
pub mod errors;
pub mod handlers;
pub mod http_server;

pub use embed::{embed_handler, embed_text, EmbedRequest, EmbedResponse, TestEmbedResponse};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{HealthResponse, WelcomeResponse, TEST_SENTENCE};
pub use http_server::{create_app, serve, start_server, AppState};
