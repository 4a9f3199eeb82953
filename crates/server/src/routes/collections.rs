use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use service::errors::ServiceError;
use service::pagination::Pagination;
use service::storage::{snapshot::parse_record, CollectionValue, RecordId, Snapshot};

use super::AppState;
use crate::errors::ApiError;
use crate::observability::record_operation;

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// `GET /{name}?page&page_size` → `{name: [...]}`
pub async fn list(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<BTreeMap<String, CollectionValue>>, ApiError> {
    record_operation("list");
    let Query(q) = query.map_err(|_| ServiceError::InvalidParams)?;
    let page = Pagination::parse(q.page.as_deref(), q.page_size.as_deref())?;
    let value = state.store.list(&collection, page).await?;
    Ok(Json(BTreeMap::from([(collection, value)])))
}

/// `GET /{name}/{id}` → the record
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<CollectionValue>, ApiError> {
    record_operation("get");
    let id: RecordId = id.parse()?;
    Ok(Json(state.store.get_by_id(&collection, id).await?))
}

/// `POST /{name}` → 201 with the whole persisted snapshot
pub async fn create(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Snapshot>), ApiError> {
    record_operation("create");
    let record = parse_record(&body)?;
    let snapshot = state.store.create(&collection, record).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// `PUT /{name}/{id}` → 204
pub async fn update(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    record_operation("update");
    let id: RecordId = id.parse()?;
    let record = parse_record(&body)?;
    state.store.update(&collection, id, record).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /{name}/{id}` → 204
pub async fn delete_by_id(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    record_operation("delete");
    let id: RecordId = id.parse()?;
    state.store.delete_by_id(&collection, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn endpoint_not_found() -> impl IntoResponse {
    ApiError::endpoint_not_found()
}
