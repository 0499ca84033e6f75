// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact Manager API Server
//!
//! Serves the contact, address and account API over HTTP.

use contact_manager::{config::Config, db::seed, db::Db, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        port = config.port,
        storage = ?config.storage,
        "Starting Contact Manager API"
    );

    // Initialize storage
    let db = Db::connect(&config)
        .await
        .expect("Failed to initialize storage");

    let state = Arc::new(AppState::new(config.clone(), db));

    // Built-in roles must exist before anyone can register
    let roles = state.identity.ensure_roles().await?;
    tracing::info!(count = roles.len(), "Roles ready");

    if config.seed_demo_data {
        seed::seed_demo_data(&state.db, &state.identity).await?;
    }

    // Build router
    let app = contact_manager::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("contact_manager=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
