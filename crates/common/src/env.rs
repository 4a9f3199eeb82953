//! Environment/runtime helpers
//!
//! Sanity checks on the backing document before the snapshot is loaded.

use std::path::Path;

use tracing::warn;

/// Ensure the backing document exists and is a regular file.
///
/// A read-only document is allowed to load, but every mutation will fail
/// to persist, so it is reported up front.
pub async fn ensure_document(path: &Path) -> anyhow::Result<()> {
    let meta = tokio::fs::metadata(path).await.map_err(|e| {
        anyhow::anyhow!(
            "cannot read {}: {e}. Make sure the file exists",
            path.display()
        )
    })?;
    if !meta.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }
    if meta.permissions().readonly() {
        warn!(path = %path.display(), "backing document is read-only; mutations will not persist");
    }
    Ok(())
}
