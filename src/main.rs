//! Server binary: loads the database file, resolves relationships, serves resource routes
//! under the configured prefix until SIGINT/SIGTERM.

use clap::Parser;
use json_mock_api::{
    build_app, load_overrides, resolve, validate_server_config, AppState, Database, ServerConfig,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("json_mock_api=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::parse();
    validate_server_config(&config)?;

    let db = Database::load(&config.db).await?;
    let overrides = load_overrides(config.resources.as_deref()).await?;
    let model = resolve(&db, &overrides, &config.foreign_key_suffix)?;
    tracing::info!(
        db = %config.db.display(),
        resources = model.resources.len(),
        read_only = config.read_only,
        persist = config.persist,
        "database loaded"
    );

    let state = AppState::from_config(db, model, &config);
    let app = build_app(state, &config);

    let listener = TcpListener::bind(config.socket_addr()).await?;
    tracing::info!("Server is running on {} port...", listener.local_addr()?.port());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
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
    tracing::info!("shutdown signal received");
}
