use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::batch::{PendingWrite, WriteBatch};
use crate::error::{StoreError, StoreResult};
use crate::keyspace::KeySpace;
use crate::traits::LocalStore;

/// File name used for the empty key, which has no hex form. Not valid hex,
/// so it cannot collide with any other key.
const EMPTY_KEY_FILE: &str = "_";

/// Durable local store keeping one file per key.
///
/// Layout: `<root>/<key space name>/<hex key>`. Every value is written to a
/// temporary file in the same directory and renamed into place, so a reader
/// sees either the old value, the new value, or nothing; never a torn write.
///
/// A batch stages all of its temporary files before renaming any of them,
/// and the renames happen under the store's publish lock, which readers
/// also take. Readers therefore see all of a batch or none of it. If a
/// rename fails, the keys already renamed are removed again before the
/// error is returned, leaving none of the batch's keys in place.
#[derive(Debug, Clone)]
pub struct FileLocalStore {
    root: PathBuf,
    publish: Arc<RwLock<()>>,
}

impl FileLocalStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        for key_space in KeySpace::ALL {
            std::fs::create_dir_all(root.join(key_space.name()))?;
        }
        debug!(root = %root.display(), "opened file local store");
        Ok(Self {
            root,
            publish: Arc::new(RwLock::new(())),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(root: &Path, key_space: KeySpace, key: &[u8]) -> PathBuf {
        let dir = root.join(key_space.name());
        if key.is_empty() {
            dir.join(EMPTY_KEY_FILE)
        } else {
            dir.join(hex::encode(key))
        }
    }

    fn stage(root: &Path, write: &PendingWrite) -> io::Result<(NamedTempFile, PathBuf)> {
        let dir = root.join(write.key_space.name());
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&write.value)?;
        tmp.as_file().sync_data()?;
        Ok((tmp, Self::path_for(root, write.key_space, &write.key)))
    }

    fn write_all(root: PathBuf, publish: &RwLock<()>, writes: Vec<PendingWrite>) -> StoreResult<()> {
        let staged = writes
            .iter()
            .map(|write| Self::stage(&root, write))
            .collect::<io::Result<Vec<_>>>()?;

        let _guard = publish.write().expect("lock poisoned");
        let mut published = Vec::with_capacity(staged.len());
        for (tmp, path) in staged {
            if let Err(e) = tmp.persist(&path) {
                Self::unpublish(&published);
                return Err(StoreError::Io(e.error));
            }
            published.push(path);
        }
        Ok(())
    }

    fn unpublish(paths: &[PathBuf]) {
        for path in paths {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "failed to roll back partial batch");
            }
        }
    }

    fn read(
        root: &Path,
        publish: &RwLock<()>,
        key_space: KeySpace,
        key: &[u8],
    ) -> StoreResult<Option<Vec<u8>>> {
        let path = Self::path_for(root, key_space, key);
        let _guard = publish.read().expect("lock poisoned");
        match std::fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn run_blocking<T, F>(f: F) -> StoreResult<T>
    where
        F: FnOnce() -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }
}

#[async_trait]
impl LocalStore for FileLocalStore {
    async fn get(&self, key_space: KeySpace, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let root = self.root.clone();
        let publish = Arc::clone(&self.publish);
        let key = key.to_vec();
        Self::run_blocking(move || Self::read(&root, &publish, key_space, &key)).await
    }

    async fn put(&self, key_space: KeySpace, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let write = PendingWrite {
            key_space,
            key: key.to_vec(),
            value: value.to_vec(),
        };
        let root = self.root.clone();
        let publish = Arc::clone(&self.publish);
        Self::run_blocking(move || Self::write_all(root, &publish, vec![write])).await
    }

    async fn flush(&self, batch: WriteBatch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let writes = batch.into_writes();
        let count = writes.len();
        let root = self.root.clone();
        let publish = Arc::clone(&self.publish);
        Self::run_blocking(move || Self::write_all(root, &publish, writes)).await?;
        debug!(count, "flushed write batch");
        Ok(())
    }

    async fn clear_key_space(&self, key_space: KeySpace) -> StoreResult<()> {
        let dir = self.root.join(key_space.name());
        let publish = Arc::clone(&self.publish);
        Self::run_blocking(move || {
            let _guard = publish.write().expect("lock poisoned");
            std::fs::remove_dir_all(&dir)?;
            std::fs::create_dir_all(&dir)?;
            Ok(())
        })
        .await
    }
}
