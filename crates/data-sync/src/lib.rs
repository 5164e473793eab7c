//! Remote Data Repository Sync
//!
//! File delivery from a versioned data repository:
//! - listing (full walk, or diff against a previous commit where the store
//!   supports it)
//! - fetching raw file content
//! - mirroring listed files into a local directory tree
//!
//! The training pipeline consumes this only as a source of raw file
//! paths/content; the store's internal versioning mechanics stay behind the
//! [`FileStore`] trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Sync error types
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("fetch failed for {path}: {reason}")]
    Fetch { path: String, reason: String },

    #[error("local I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Data repository coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Repository name
    pub repo: String,
    /// Branch to read from
    pub branch: String,
    /// Project namespace
    pub project: String,
    /// Local root the files are mirrored under
    pub root: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            repo: "churn-data".to_string(),
            branch: "master".to_string(),
            project: "default".to_string(),
            root: PathBuf::from("data"),
        }
    }
}

/// One file visible in the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Path relative to the repository root
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time, where the store reports one
    pub modified: Option<DateTime<Utc>>,
}

/// Source of raw file paths and content.
///
/// `list_files(Some(commit))` asks the store for the files changed since
/// that commit; `list_files(None)` walks everything.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// List files, optionally restricted to those changed since a commit
    async fn list_files(&self, since_commit: Option<&str>) -> Result<Vec<RemoteFile>, SyncError>;

    /// Fetch one file's raw bytes
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, SyncError>;
}

/// Directory-backed store used by the trainer in local runs and by tests.
///
/// Carries no commit history, so a `since_commit` listing falls back to a
/// full walk.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store over an existing directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileStore for LocalStore {
    async fn list_files(&self, since_commit: Option<&str>) -> Result<Vec<RemoteFile>, SyncError> {
        if since_commit.is_some() {
            debug!("Local store has no commit history; listing all files");
        }

        let mut files = Vec::new();
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| SyncError::Connection(format!("{}: {e}", dir.display())))?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let meta = entry.metadata().await?;
                if meta.is_dir() {
                    pending.push(path);
                } else {
                    let relative = path
                        .strip_prefix(&self.root)
                        .unwrap_or(&path)
                        .to_string_lossy()
                        .into_owned();
                    files.push(RemoteFile {
                        path: relative,
                        size: meta.len(),
                        modified: meta.modified().ok().map(DateTime::<Utc>::from),
                    });
                }
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>, SyncError> {
        tokio::fs::read(self.root.join(path))
            .await
            .map_err(|e| SyncError::Fetch {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Mirror every listed file under `dest_root`, creating parent directories
/// as needed. Returns the local paths written, in listing order.
pub async fn sync_to(
    store: &dyn FileStore,
    dest_root: &Path,
    since_commit: Option<&str>,
) -> Result<Vec<PathBuf>, SyncError> {
    tokio::fs::create_dir_all(dest_root).await?;

    let files = store.list_files(since_commit).await?;
    info!(
        count = files.len(),
        dest = %dest_root.display(),
        "Starting dataset download"
    );

    let mut written = Vec::with_capacity(files.len());
    for file in &files {
        let dest = dest_root.join(&file.path);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = store.fetch(&file.path).await?;
        tokio::fs::write(&dest, &bytes).await?;
        debug!(src = %file.path, dest = %dest.display(), "Downloaded file");
        written.push(dest);
    }

    info!("Download operation ended");
    Ok(written)
}
