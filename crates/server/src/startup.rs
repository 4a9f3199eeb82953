use std::sync::Arc;

use axum::Router;
use common::{admin_http::spawn_admin_server, env::ensure_document};
use configs::AppConfig;
use service::collections::{CollectionStore, FileSnapshotStore};
use service::storage::Layout;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::observability;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load the backing document named by `cfg.storage`. Any failure here is fatal.
pub async fn open_store(cfg: &AppConfig) -> Result<Arc<FileSnapshotStore>, StartupError> {
    ensure_document(&cfg.storage.file).await?;
    let layout = Layout::from_minified(cfg.storage.minified);
    Ok(FileSnapshotStore::open(&cfg.storage.file, layout).await?)
}

/// Router over an already loaded store.
pub fn build_app(store: Arc<dyn CollectionStore>) -> Router {
    routes::build_router(AppState::new(store), build_cors())
}

/// The lines printed at startup: one URL per collection.
pub fn resource_listing(names: &[String], port: u16) -> String {
    let base_url = format!("http://localhost:{port}");
    let mut out = String::from("Resources available\n");
    out.push_str(&"-".repeat(71));
    out.push('\n');
    for name in names {
        out.push_str(&format!("{base_url}/{name}\n"));
    }
    out
}

/// Public entry: load the document, build the app and run the HTTP server until Ctrl+C.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    let store = open_store(&cfg).await?;
    let names = store.names().await;
    println!("{}", resource_listing(&names, cfg.server.port));
    info!(
        file = %cfg.storage.file.display(),
        minified = cfg.storage.minified,
        collections = names.len(),
        "backing document loaded"
    );

    if let Some(admin_addr) = cfg.admin.socket_addr() {
        spawn_admin_server(admin_addr, observability::encode_metrics).await?;
    }

    let app = build_app(store);

    let addr = cfg
        .bind_addr()
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, shutting down");
    }
}
