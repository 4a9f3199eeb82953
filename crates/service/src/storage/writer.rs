use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::errors::ServiceError;
use crate::storage::snapshot::Snapshot;

/// Textual layout of the rewritten document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// Two-space indented.
    #[default]
    Pretty,
    /// Single line.
    Compact,
}

impl Layout {
    pub fn from_minified(minified: bool) -> Self {
        if minified { Self::Compact } else { Self::Pretty }
    }
}

/// Rewrites the whole backing document from a snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
    layout: Layout,
}

impl SnapshotWriter {
    pub fn new<P: Into<PathBuf>>(path: P, layout: Layout) -> Self {
        Self { path: path.into(), layout }
    }

    pub fn encode(&self, snapshot: &Snapshot) -> Result<Vec<u8>, ServiceError> {
        let encoded = match self.layout {
            Layout::Pretty => serde_json::to_vec_pretty(snapshot),
            Layout::Compact => serde_json::to_vec(snapshot),
        };
        encoded.map_err(|e| ServiceError::Persistence(e.to_string()))
    }

    /// Replace the document atomically: temp file, fsync, rename.
    ///
    /// A symlinked document is followed, so the link survives and its target
    /// is the file replaced. The target keeps its permissions.
    pub async fn write(&self, snapshot: &Snapshot) -> Result<(), ServiceError> {
        let data = self.encode(snapshot)?;
        let target = resolve_target(&self.path).await;
        let tmp = temp_path(&target);
        if let Err(e) = write_synced(&tmp, &data, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::Persistence(format!("{}: {e}", tmp.display())));
        }
        if let Err(e) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::Persistence(format!("{}: {e}", target.display())));
        }
        debug!(path = %target.display(), bytes = data.len(), "snapshot written");
        Ok(())
    }
}

/// The real file behind `path`; `path` itself when it cannot be resolved yet.
async fn resolve_target(path: &Path) -> PathBuf {
    fs::canonicalize(path).await.unwrap_or_else(|_| path.to_path_buf())
}

async fn write_synced(path: &Path, data: &[u8], target: &Path) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    if let Ok(meta) = fs::metadata(target).await {
        file.set_permissions(meta.permissions()).await?;
    }
    file.sync_all().await?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("snapshot"));
    name.push(".tmp");
    path.with_file_name(name)
}
