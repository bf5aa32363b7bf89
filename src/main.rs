// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use embedding_service::{
    api::{start_server, AppState},
    config::ServiceConfig,
    embeddings::load_model,
    version,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::parse();
    config.validate().context("Invalid configuration")?;

    println!("🚀 Starting {}", version::get_version_string());
    info!("Configuration: {:?}", config);
    info!("Features: {}", version::FEATURES.join(", "));

    // Startup is fatal on load failure: nothing is served without a model
    println!("🧠 Loading embedding model {}...", config.model_name);
    let model = load_model(&config)
        .await
        .context("Embedding model failed to load")?;
    println!(
        "✅ Model ready: {} ({} dimensions)",
        model.model_name(),
        model.dimension()
    );

    let addr = config.socket_addr();
    let separator = "=".repeat(60);
    println!("\n{}", separator);
    println!("Listening on:  {}", addr);
    println!("\nAPI Endpoints:");
    println!("  Index:        GET  http://localhost:{}/", config.port);
    println!("  Embed:        POST http://localhost:{}/embed", config.port);
    println!("  Self-test:    GET  http://localhost:{}/test-embed", config.port);
    println!("  Health:       GET  http://localhost:{}/health", config.port);
    println!("\nTest with curl:");
    println!("  curl -X POST http://localhost:{}/embed \\", config.port);
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"text\": \"hello world\"}}'");
    println!("\nPress Ctrl+C to shutdown...");
    println!("{}\n", separator);

    start_server(addr, AppState::new(model)).await?;

    println!("👋 Goodbye!");
    Ok(())
}
