//! In-memory cache of file contents fetched from source control
//!
//! Keys are `(repository, revision, path)`. Entries live for the whole run
//! and are never invalidated, since an audit works on a single snapshot.
//! A lookup that finds nothing is cached too, so each key reaches the
//! source control host at most once, even when projects are processed
//! concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::audit::error::CacheError;
use crate::audit::source::SourceControl;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey {
    pub repository: String,
    pub revision: String,
    pub path: String,
}

impl FileKey {
    pub fn new(repository: &str, revision: &str, path: &str) -> Self {
        Self {
            repository: repository.to_string(),
            revision: revision.to_string(),
            path: path.to_string(),
        }
    }
}

type Entry = Arc<OnceCell<Option<String>>>;

#[derive(Default)]
pub struct FileCache {
    entries: Mutex<HashMap<FileKey, Entry>>,
}

impl FileCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_entries(&self) -> Result<MutexGuard<'_, HashMap<FileKey, Entry>>, CacheError> {
        self.entries.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Returns the text of `path` at `revision`, fetching it on first use
    ///
    /// A failed fetch is logged and remembered as absent; it is not retried.
    pub async fn fetch_text(
        &self,
        source: &dyn SourceControl,
        repository: &str,
        path: &str,
        revision: &str,
    ) -> Result<Option<String>, CacheError> {
        let key = FileKey::new(repository, revision, path);
        let entry = self.lock_entries()?.entry(key).or_default().clone();

        let text = entry
            .get_or_init(|| async {
                debug!("Fetching {}:{} at {}", repository, path, revision);
                source
                    .get_file_text(repository, path, revision)
                    .await
                    .inspect_err(|e| {
                        warn!(
                            "Failed to fetch {}:{} at {}: {}",
                            repository, path, revision, e
                        )
                    })
                    .unwrap_or(None)
            })
            .await;

        Ok(text.clone())
    }

    /// Number of distinct keys looked up so far
    pub fn len(&self) -> Result<usize, CacheError> {
        Ok(self.lock_entries()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.lock_entries()?.is_empty())
    }
}
