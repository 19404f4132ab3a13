//! [`KeyValueStore`] adapter storing one `<key>.json` file per key.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde_json::Value;
use tokio::task;
use tracing::debug;

use super::atomic_io::write_atomic;
use crate::domain::ports::{KeyValueStore, StoreError, StoreKey};

/// File-per-key JSON store rooted at a data directory.
///
/// All file access goes through a `cap_std` directory handle, so the adapter
/// cannot touch anything outside its data directory. Writes replace files
/// atomically; a missing file reads as an absent key.
#[derive(Debug, Clone)]
pub struct CapStdKeyValueStore {
    dir: Arc<Dir>,
}

impl CapStdKeyValueStore {
    /// Open (creating if needed) the data directory at `path`.
    ///
    /// # Examples
    /// ```no_run
    /// use camino::Utf8Path;
    /// use complaint_desk::outbound::storage::CapStdKeyValueStore;
    ///
    /// let store = CapStdKeyValueStore::open(Utf8Path::new("./desk-data")).expect("data dir");
    /// # drop(store);
    /// ```
    pub fn open(path: &Utf8Path) -> Result<Self, StoreError> {
        Dir::create_ambient_dir_all(path, ambient_authority())
            .map_err(|err| StoreError::backend(format!("cannot create {path}: {err}")))?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(|err| StoreError::backend(format!("cannot open {path}: {err}")))?;
        debug!(path = %path, "opened data directory");
        Ok(Self::from_dir(dir))
    }

    /// Wrap an already opened directory.
    pub fn from_dir(dir: Dir) -> Self {
        Self { dir: Arc::new(dir) }
    }

    fn file_name(key: StoreKey) -> String {
        format!("{}.json", key.as_str())
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, StoreError> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        task::spawn_blocking(move || op(&dir))
            .await
            .map_err(|err| StoreError::backend(format!("storage task failed: {err}")))?
    }
}

fn read_document(dir: &Dir, key: StoreKey) -> Result<Option<Value>, StoreError> {
    let text = match dir.read_to_string(CapStdKeyValueStore::file_name(key)) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StoreError::backend(format!("cannot read {key}: {err}"))),
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|err| StoreError::corrupt(key.as_str(), err.to_string()))
}

#[async_trait]
impl KeyValueStore for CapStdKeyValueStore {
    async fn load(&self, key: StoreKey) -> Result<Option<Value>, StoreError> {
        self.blocking(move |dir| read_document(dir, key)).await
    }

    async fn save(&self, key: StoreKey, value: &Value) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(value)
            .map_err(|err| StoreError::backend(format!("cannot encode {key}: {err}")))?;
        self.blocking(move |dir| {
            write_atomic(dir, &Self::file_name(key), &contents)
                .map_err(|err| StoreError::backend(format!("cannot write {key}: {err}")))
        })
        .await
    }

    async fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        self.blocking(move |dir| match dir.remove_file(Self::file_name(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::backend(format!("cannot remove {key}: {err}"))),
        })
        .await
    }
}
