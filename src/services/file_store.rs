use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("file store I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Storage backend for platform file attachments.
///
/// Paths are relative to the store root, as recorded in the file-info
/// table.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn exists(&self, path: &str) -> Result<bool, FileStoreError>;

    /// Remove a stored file. Removing a missing file is not an error.
    async fn remove(&self, path: &str) -> Result<(), FileStoreError>;
}

/// Local-filesystem file store.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn exists(&self, path: &str) -> Result<bool, FileStoreError> {
        let full = self.resolve(path);
        tokio::fs::try_exists(&full).await.map_err(|source| io_err(&full, source))
    }

    async fn remove(&self, path: &str) -> Result<(), FileStoreError> {
        let full = self.resolve(path);
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(io_err(&full, source)),
        }
    }
}

fn io_err(path: &Path, source: std::io::Error) -> FileStoreError {
    FileStoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remove_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.png"), b"bytes")
            .await
            .unwrap();

        let store = LocalFileStore::new(dir.path());
        assert!(store.exists("a.png").await.unwrap());
        store.remove("a.png").await.unwrap();
        assert!(!store.exists("a.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        store.remove("nope.png").await.unwrap();
    }
}
