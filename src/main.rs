use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get},
    Router,
};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

mod config;
mod error;
mod handlers;
mod models;
mod store;
mod uploads;

use crate::config::Config;
use crate::store::ItemStore;
use crate::uploads::UploadStore;

/// Shared application state — cheap to clone (all heap behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<ItemStore>>,
    pub uploads: Arc<UploadStore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,inventory_tracker=debug".parse().unwrap()),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Inventory Tracker  — Rust + Axum    ║");
    info!("║  In-memory store · Image uploads     ║");
    info!("╚══════════════════════════════════════╝");

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!(dir = %config.upload_dir, "Upload directory ready");

    let state = AppState {
        store: Arc::new(RwLock::new(ItemStore::new())),
        uploads: Arc::new(UploadStore::new(&config.upload_dir)),
    };

    let app = build_router(state, Path::new(&config.public_dir));

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on http://{}", addr);
    info!(
        "Serving client from {}/  →  open http://{} in a browser",
        config.public_dir, addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState, public_dir: &Path) -> Router {
    let uploaded_images = ServeDir::new(state.uploads.dir());

    Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health))

        // ── Items ───────────────────────────────────────────────────────────
        .route(
            "/api/items",
            get(handlers::items::list_items).post(handlers::items::create_item),
        )
        .route("/api/items/:id", delete(handlers::items::delete_item))

        // ── Static files ────────────────────────────────────────────────────
        .nest_service("/uploads", uploaded_images)
        .fallback_service(ServeDir::new(public_dir))

        // ── Middleware ──────────────────────────────────────────────────────
        // Whole images travel in the multipart body (axum's default cap is 2 MB)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
