//! Lightweight admin HTTP server spawner
//!
//! Exposes `/healthz` and `/metrics` on their own listener, with metrics
//! provided by the caller. Keeping them off the main router means no
//! collection name can be shadowed by an admin path.

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::types::Health;

async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics_handler(f: fn() -> (StatusCode, String)) -> (StatusCode, String) {
    f()
}

/// Router serving the admin endpoints; split out so tests can drive it in-process.
pub fn admin_router(metrics_fn: fn() -> (StatusCode, String)) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(move || metrics_handler(metrics_fn)))
}

/// Bind `addr` and serve the admin endpoints on a background task.
/// Binding errors are returned to the caller; serve errors are logged.
pub async fn spawn_admin_server(
    addr: SocketAddr,
    metrics_fn: fn() -> (StatusCode, String),
) -> anyhow::Result<JoinHandle<()>> {
    let listener = TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "admin server listening");
    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, admin_router(metrics_fn)).await {
            error!(error = %e, "admin server stopped");
        }
    }))
}
