use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::{routing::get, Router};
use service::collections::CollectionStore;
use tower_http::{
    cors::CorsLayer,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod collections;

/// Shared handler state: the collection engine behind its trait.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CollectionStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }
}

/// Build the application router: the five collection routes plus a JSON 404 fallback.
///
/// Collections are addressed by the first path segment; names missing from
/// the snapshot answer like any other unmatched route.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route(
            "/:collection",
            get(collections::list).post(collections::create),
        )
        .route(
            "/:collection/:id",
            get(collections::get_by_id)
                .put(collections::update)
                .delete(collections::delete_by_id),
        )
        .fallback(collections::endpoint_not_found)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
