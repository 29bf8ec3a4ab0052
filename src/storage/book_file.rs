//! Whole-collection file store.
//!
//! The entire book collection lives in one JSON file and every mutation is a
//! read-modify-write of the whole array. A single coarse lock serializes the
//! file accesses of concurrent requests; the lock covers only the file read
//! or write itself, never validation or business logic.

use std::path::Path;
use std::path::PathBuf;

use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::info;

use crate::Book;
use crate::Result;
use crate::StorageError;

/// JSON-file backed store for the full book collection.
///
/// Lives for the whole process: created once at startup, shared behind an
/// `Arc` by every request handler and listener session.
#[derive(Debug)]
pub struct BookFile {
    path: PathBuf,
    // Coarse lock: one file access at a time, reads and writes alike.
    file_lock: Mutex<()>,
}

impl BookFile {
    /// Opens the store at `path`, initializing an empty collection file if
    /// none exists yet. Missing files are only tolerated here; once open,
    /// an absent or unreadable file is a hard storage error.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(StorageError::Io)?;
            }
        }

        match fs::metadata(&path).await {
            Ok(_) => debug!("opening existing book file at {:?}", path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no book file at {:?}, initializing empty collection", path);
                fs::write(&path, b"[]").await.map_err(StorageError::Io)?;
            }
            Err(e) => return Err(StorageError::Io(e).into()),
        }

        Ok(Self {
            path,
            file_lock: Mutex::new(()),
        })
    }

    /// Reads the full collection, reflecting the latest completed write.
    ///
    /// # Errors
    /// - [`StorageError::Io`] when the file cannot be read
    /// - [`StorageError::Corrupt`] when the file exists but does not parse;
    ///   never silently degraded to an empty collection
    pub async fn read(&self) -> Result<Vec<Book>> {
        let bytes = {
            let _guard = self.file_lock.lock().await;
            fs::read(&self.path).await.map_err(StorageError::Io)?
        };

        let books = serde_json::from_slice(&bytes).map_err(StorageError::Corrupt)?;
        Ok(books)
    }

    /// Atomically replaces the persisted collection with `books`.
    ///
    /// Serialization happens outside the lock; the critical section is the
    /// temp-file write plus rename over the target.
    pub async fn write(&self, books: &[Book]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(books).map_err(StorageError::Corrupt)?;

        let tmp = self.path.with_extension("json.tmp");
        {
            let _guard = self.file_lock.lock().await;
            fs::write(&tmp, &bytes).await.map_err(StorageError::Io)?;
            fs::rename(&tmp, &self.path).await.map_err(StorageError::Io)?;
        }

        debug!("persisted {} book(s) to {:?}", books.len(), self.path);
        Ok(())
    }
}
