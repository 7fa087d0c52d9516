use async_trait::async_trait;
use vos_types::{Blob, BlobMetadata, ObjectId, Tree};

use crate::batch::WriteBatch;
use crate::codec;
use crate::error::StoreResult;
use crate::keyspace::KeySpace;

/// Persistent local cache of fetched objects.
///
/// All implementations must satisfy these invariants:
/// - Safe for concurrent invocation from many in-flight requests, including
///   a `put` racing with another caller's unflushed batch.
/// - Rewriting a key replaces its value wholesale (last write wins); values
///   are never merged.
/// - A flushed [`WriteBatch`] becomes visible in one step with respect to its
///   own writes.
///
/// The typed helpers (`get_tree`, `put_blob_metadata`, ...) are provided on
/// top of the raw byte interface and share the encodings in [`codec`].
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key is absent.
    async fn get(&self, key_space: KeySpace, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Write a single value, replacing any previous one.
    async fn put(&self, key_space: KeySpace, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Publish every write queued in `batch`.
    async fn flush(&self, batch: WriteBatch) -> StoreResult<()>;

    /// Drop every key in a key space.
    async fn clear_key_space(&self, key_space: KeySpace) -> StoreResult<()>;

    /// Check whether a key is present.
    async fn has_key(&self, key_space: KeySpace, key: &[u8]) -> StoreResult<bool> {
        Ok(self.get(key_space, key).await?.is_some())
    }

    /// Start a batch sized for roughly `size_hint` writes.
    fn begin_write(&self, size_hint: usize) -> WriteBatch {
        WriteBatch::with_capacity(size_hint)
    }

    async fn get_tree(&self, id: &ObjectId) -> StoreResult<Option<Tree>> {
        match self.get(KeySpace::Tree, id.as_bytes()).await? {
            Some(data) => codec::decode_tree(id, &data).map(Some),
            None => Ok(None),
        }
    }

    async fn get_blob(&self, id: &ObjectId) -> StoreResult<Option<Blob>> {
        Ok(self
            .get(KeySpace::Blob, id.as_bytes())
            .await?
            .map(codec::decode_blob))
    }

    async fn get_blob_metadata(&self, id: &ObjectId) -> StoreResult<Option<BlobMetadata>> {
        match self.get(KeySpace::BlobMetadata, id.as_bytes()).await? {
            Some(data) => codec::decode_blob_metadata(&data).map(Some),
            None => Ok(None),
        }
    }

    /// Write a tree under its own id.
    async fn put_tree(&self, tree: &Tree) -> StoreResult<()> {
        let value = codec::encode_tree(tree)?;
        self.put(KeySpace::Tree, tree.id().as_bytes(), &value).await
    }

    async fn put_blob(&self, id: &ObjectId, blob: &Blob) -> StoreResult<()> {
        self.put(KeySpace::Blob, id.as_bytes(), blob.contents()).await
    }

    async fn put_blob_metadata(&self, id: &ObjectId, metadata: &BlobMetadata) -> StoreResult<()> {
        let value = codec::encode_blob_metadata(metadata)?;
        self.put(KeySpace::BlobMetadata, id.as_bytes(), &value).await
    }
}
