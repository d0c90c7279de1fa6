use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod config;
mod db;
mod error;
mod handlers;
mod models;

use crate::config::Config;
use crate::db::{InventoryStore, MongoInventoryStore};

/// Shared application state. The store is built once at startup and handed to
/// every handler; handlers never hold anything across requests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InventoryStore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,inventory_api=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("Connecting to MongoDB...");
    let client = db::connect(&config).await?;
    let database = db::database_for(&client, &config);
    info!("MongoDB connection established.");

    let state = AppState {
        store: Arc::new(MongoInventoryStore::new(&database)),
    };

    let app = build_router(state, &config.base_path);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on http://{}{}", addr, config.base_path);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Closing MongoDB client...");
    client.shutdown().await;
    info!("Shutdown complete.");

    Ok(())
}

fn build_router(state: AppState, base_path: &str) -> Router {
    let router = Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health));

    // ── Inventory ───────────────────────────────────────────────────────────
    let router = if base_path == "/" {
        router.merge(handlers::inventory::routes())
    } else {
        router.nest(base_path, handlers::inventory::routes())
    };

    router
        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received, draining connections...");
}
