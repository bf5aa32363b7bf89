// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::embed::embed_handler;
use super::handlers::{
    health_handler, index_handler, method_not_allowed_handler, not_found_handler,
    test_embed_handler,
};
use crate::embeddings::EmbeddingModel;

/// Shared request state. The model is loaded before this is built and is
/// never replaced.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn EmbeddingModel>,
}

impl AppState {
    pub fn new(model: Arc<dyn EmbeddingModel>) -> Self {
        Self { model }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler).fallback(method_not_allowed_handler))
        .route("/embed", post(embed_handler).fallback(method_not_allowed_handler))
        .route(
            "/test-embed",
            get(test_embed_handler).fallback(method_not_allowed_handler),
        )
        .route("/health", get(health_handler).fallback(method_not_allowed_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves on an already bound listener until Ctrl-C or SIGTERM
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let app = create_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Embedding service listening on {}", listener.local_addr()?);
    serve(listener, state).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
