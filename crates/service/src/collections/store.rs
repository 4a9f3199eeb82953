use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::collections::engine;
use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::storage::{CollectionValue, Layout, Record, RecordId, Snapshot, SnapshotWriter};

/// Trait abstraction over the collection engine.
/// The dispatch layer only sees this; the file-backed store is the one implementation.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Collection names in sorted order.
    async fn names(&self) -> Vec<String>;
    async fn list(&self, name: &str, page: Pagination) -> Result<CollectionValue, ServiceError>;
    async fn get_by_id(&self, name: &str, id: RecordId) -> Result<CollectionValue, ServiceError>;
    /// Returns the whole snapshot as persisted.
    async fn create(&self, name: &str, body: Record) -> Result<Snapshot, ServiceError>;
    async fn update(&self, name: &str, id: RecordId, body: Record) -> Result<(), ServiceError>;
    async fn delete_by_id(&self, name: &str, id: RecordId) -> Result<(), ServiceError>;
    async fn snapshot(&self) -> Snapshot;
}

/// Snapshot held in memory and rewritten to the backing document after every mutation.
///
/// A mutation holds the write guard from the in-memory change until the
/// file write returns, so writers are serialized and readers never see a
/// half-applied change. If the write fails the in-memory change stays.
#[derive(Clone)]
pub struct FileSnapshotStore {
    inner: Arc<RwLock<Snapshot>>,
    writer: Arc<SnapshotWriter>,
}

impl FileSnapshotStore {
    /// Load the backing document. Missing or malformed documents are a `Load` error.
    pub async fn open<P: Into<PathBuf>>(path: P, layout: Layout) -> Result<Arc<Self>, ServiceError> {
        let path = path.into();
        let snapshot = Snapshot::load(&path).await?;
        info!(path = %path.display(), collections = snapshot.len(), "snapshot loaded");
        Ok(Self::with_snapshot(snapshot, SnapshotWriter::new(path, layout)))
    }

    pub fn with_snapshot(snapshot: Snapshot, writer: SnapshotWriter) -> Arc<Self> {
        Arc::new(Self { inner: Arc::new(RwLock::new(snapshot)), writer: Arc::new(writer) })
    }

    async fn read<F, R>(&self, name: &str, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&CollectionValue) -> Result<R, ServiceError>,
    {
        let snapshot = self.inner.read().await;
        let value = snapshot
            .get(name)
            .ok_or_else(|| ServiceError::UnknownCollection(name.to_string()))?;
        f(value)
    }

    /// Apply `f` to one collection and persist the whole snapshot, under the write guard.
    ///
    /// Runs on its own task so a dropped request still finishes the change
    /// and the write. With `echo` the persisted snapshot is returned.
    async fn mutate<F, R>(&self, name: &str, op: &'static str, echo: bool, f: F) -> Result<(R, Option<Snapshot>), ServiceError>
    where
        F: FnOnce(&mut CollectionValue) -> Result<R, ServiceError> + Send + 'static,
        R: Send + 'static,
    {
        let this = self.clone();
        let name = name.to_string();
        let task = tokio::spawn(async move {
            let mut snapshot = this.inner.write().await;
            let value = snapshot
                .get_mut(&name)
                .ok_or_else(|| ServiceError::UnknownCollection(name.clone()))?;
            let out = f(value)?;
            if let Err(e) = this.writer.write(&snapshot).await {
                error!(collection = %name, op, error = %e, "snapshot not persisted; memory and document diverge");
                return Err(e);
            }
            debug!(collection = %name, op, "mutation persisted");
            let echoed = echo.then(|| snapshot.clone());
            Ok::<_, ServiceError>((out, echoed))
        });
        task.await
            .map_err(|e| ServiceError::Persistence(format!("{op} task failed: {e}")))?
    }
}

#[async_trait]
impl CollectionStore for FileSnapshotStore {
    async fn names(&self) -> Vec<String> {
        self.inner.read().await.names().map(str::to_string).collect()
    }

    async fn list(&self, name: &str, page: Pagination) -> Result<CollectionValue, ServiceError> {
        self.read(name, |value| Ok(engine::list(value, page))).await
    }

    async fn get_by_id(&self, name: &str, id: RecordId) -> Result<CollectionValue, ServiceError> {
        self.read(name, |value| engine::get_by_id(value, id)).await
    }

    async fn create(&self, name: &str, body: Record) -> Result<Snapshot, ServiceError> {
        let ((), snapshot) = self
            .mutate(name, "create", true, move |value| engine::create(value, body))
            .await?;
        info!(collection = %name, "record created");
        Ok(snapshot.unwrap_or_default())
    }

    async fn update(&self, name: &str, id: RecordId, body: Record) -> Result<(), ServiceError> {
        self.mutate(name, "update", false, move |value| engine::update(value, id, &body))
            .await?;
        info!(collection = %name, id = id.0, "record updated");
        Ok(())
    }

    async fn delete_by_id(&self, name: &str, id: RecordId) -> Result<(), ServiceError> {
        let (removed, _) = self
            .mutate(name, "delete", false, move |value| engine::delete_by_id(value, id))
            .await?;
        info!(collection = %name, id = id.0, removed, "records deleted");
        Ok(())
    }

    async fn snapshot(&self) -> Snapshot {
        self.inner.read().await.clone()
    }
}
