//! Directory creation and cleanup.

use std::io;
use std::path::Path;

/// Permissions for directories created by [`ensure_dir`] (rwxr-xr-x).
pub const DIR_MODE: u32 = 0o755;

/// Create `path` and any missing parents. An existing directory is a no-op.
pub async fn ensure_dir(path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if tokio::fs::try_exists(path).await? {
        return Ok(());
    }

    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);
    builder.create(path).await?;

    tracing::debug!(path = %path.display(), "Created directory");
    Ok(())
}

/// Remove every entry directly inside `path`, keeping `path` itself.
///
/// Subdirectories are removed only when empty; a non-empty one makes this
/// fail part way through.
pub async fn clean_directory(path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    let mut entries = tokio::fs::read_dir(path).await?;
    let mut removed = 0usize;
    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        if file_type.is_dir() {
            tokio::fs::remove_dir(entry.path()).await?;
        } else {
            tokio::fs::remove_file(entry.path()).await?;
        }
        removed += 1;
    }

    tracing::debug!(path = %path.display(), removed, "Cleaned directory");
    Ok(())
}
