use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::batch::WriteBatch;
use crate::error::{StoreError, StoreResult};
use crate::keyspace::KeySpace;
use crate::traits::LocalStore;

type Space = HashMap<Vec<u8>, Vec<u8>>;

/// In-memory, HashMap-based local store.
///
/// Intended for tests and embedding. Every key space is held behind a single
/// `RwLock`, so a flushed batch becomes visible in one step. The store counts
/// the writes it receives per key space and can be told to fail reads or
/// writes, which lets callers exercise their fault handling.
pub struct MemoryLocalStore {
    spaces: RwLock<[Space; 3]>,
    writes: [AtomicU64; 3],
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryLocalStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            spaces: RwLock::new(Default::default()),
            writes: Default::default(),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Number of keys currently stored in a key space.
    pub fn len(&self, key_space: KeySpace) -> usize {
        self.spaces.read().expect("lock poisoned")[key_space.index()].len()
    }

    /// Returns `true` if no key space holds anything.
    pub fn is_empty(&self) -> bool {
        self.spaces
            .read()
            .expect("lock poisoned")
            .iter()
            .all(HashMap::is_empty)
    }

    /// Synchronous presence check, for assertions.
    pub fn contains(&self, key_space: KeySpace, key: &[u8]) -> bool {
        self.spaces.read().expect("lock poisoned")[key_space.index()].contains_key(key)
    }

    /// Total number of values ever written into a key space, counting
    /// overwrites.
    pub fn write_count(&self, key_space: KeySpace) -> u64 {
        self.writes[key_space.index()].load(Ordering::Relaxed)
    }

    /// Make every subsequent read fail until reset.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Make every subsequent write or flush fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

impl Default for MemoryLocalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get(&self, key_space: KeySpace, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("reads disabled".into()));
        }
        let spaces = self.spaces.read().expect("lock poisoned");
        Ok(spaces[key_space.index()].get(key).cloned())
    }

    async fn put(&self, key_space: KeySpace, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.check_writable()?;
        let mut spaces = self.spaces.write().expect("lock poisoned");
        spaces[key_space.index()].insert(key.to_vec(), value.to_vec());
        self.writes[key_space.index()].fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn flush(&self, batch: WriteBatch) -> StoreResult<()> {
        self.check_writable()?;
        let mut spaces = self.spaces.write().expect("lock poisoned");
        for write in batch.into_writes() {
            let index = write.key_space.index();
            spaces[index].insert(write.key, write.value);
            self.writes[index].fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    async fn clear_key_space(&self, key_space: KeySpace) -> StoreResult<()> {
        self.spaces.write().expect("lock poisoned")[key_space.index()].clear();
        Ok(())
    }
}

impl std::fmt::Debug for MemoryLocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLocalStore")
            .field("trees", &self.len(KeySpace::Tree))
            .field("blobs", &self.len(KeySpace::Blob))
            .field("blob_metadata", &self.len(KeySpace::BlobMetadata))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vos_types::{Blob, BlobMetadata, ContentHash, ObjectId, Tree, TreeEntry, TreeEntryType};

    fn id(s: &'static [u8]) -> ObjectId {
        ObjectId::from(s)
    }

    #[tokio::test]
    async fn put_and_get_tree() {
        let store = MemoryLocalStore::new();
        let tree = Tree::new(
            id(b"t1"),
            vec![(
                "hello.txt".to_string(),
                TreeEntry::new(TreeEntryType::Regular, id(b"h")),
            )],
        );
        store.put_tree(&tree).await.unwrap();
        assert_eq!(store.get_tree(&id(b"t1")).await.unwrap(), Some(tree));
        assert_eq!(store.len(KeySpace::Tree), 1);
    }

    #[tokio::test]
    async fn missing_key_reads_none() {
        let store = MemoryLocalStore::new();
        assert!(store.get_blob(&id(b"nope")).await.unwrap().is_none());
        assert!(!store.has_key(KeySpace::Blob, b"nope").await.unwrap());
    }

    #[tokio::test]
    async fn key_spaces_are_disjoint() {
        let store = MemoryLocalStore::new();
        store
            .put_blob(&id(b"x"), &Blob::new(b"contents".to_vec()))
            .await
            .unwrap();
        assert!(store.contains(KeySpace::Blob, b"x"));
        assert!(!store.contains(KeySpace::BlobMetadata, b"x"));
        assert!(store.get_blob_metadata(&id(b"x")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn batch_is_invisible_until_flushed() {
        let store = MemoryLocalStore::new();
        let meta = BlobMetadata::new(ContentHash::from_bytes([3; 32]), 3);
        let mut batch = store.begin_write(1);
        batch.put_blob_metadata(&id(b"b"), &meta).unwrap();
        assert!(store.get_blob_metadata(&id(b"b")).await.unwrap().is_none());

        store.flush(batch).await.unwrap();
        assert_eq!(store.get_blob_metadata(&id(b"b")).await.unwrap(), Some(meta));
        assert_eq!(store.write_count(KeySpace::BlobMetadata), 1);
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let store = MemoryLocalStore::new();
        store.put(KeySpace::Blob, b"k", b"one").await.unwrap();
        store.put(KeySpace::Blob, b"k", b"two").await.unwrap();
        assert_eq!(store.get(KeySpace::Blob, b"k").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.len(KeySpace::Blob), 1);
        assert_eq!(store.write_count(KeySpace::Blob), 2);
    }

    #[tokio::test]
    async fn injected_faults() {
        let store = MemoryLocalStore::new();
        store.set_fail_writes(true);
        assert!(matches!(
            store.put(KeySpace::Blob, b"k", b"v").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.flush(store.begin_write(0)).await.is_err());
        assert!(store.is_empty());

        store.set_fail_writes(false);
        store.put(KeySpace::Blob, b"k", b"v").await.unwrap();
        store.set_fail_reads(true);
        assert!(store.get(KeySpace::Blob, b"k").await.is_err());
    }

    #[tokio::test]
    async fn clear_key_space_leaves_others() {
        let store = MemoryLocalStore::new();
        store.put(KeySpace::Blob, b"a", b"1").await.unwrap();
        store.put(KeySpace::Tree, b"b", b"2").await.unwrap();
        store.clear_key_space(KeySpace::Blob).await.unwrap();
        assert_eq!(store.len(KeySpace::Blob), 0);
        assert_eq!(store.len(KeySpace::Tree), 1);
    }

    #[tokio::test]
    async fn concurrent_writers_of_one_key() {
        let store = Arc::new(MemoryLocalStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.put(KeySpace::Blob, b"same", b"identical").await.unwrap();
                })
            })
            .collect();
        for h in handles {
            h.await.expect("task should not panic");
        }
        assert_eq!(store.len(KeySpace::Blob), 1);
        assert_eq!(
            store.get(KeySpace::Blob, b"same").await.unwrap(),
            Some(b"identical".to_vec())
        );
    }

    #[test]
    fn debug_format() {
        let debug = format!("{:?}", MemoryLocalStore::default());
        assert!(debug.contains("MemoryLocalStore"));
        assert!(debug.contains("blob_metadata"));
    }
}
