use vos_types::{Blob, BlobMetadata, ObjectId, Tree};

use crate::codec;
use crate::error::StoreResult;
use crate::keyspace::KeySpace;

/// One write waiting in a [`WriteBatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingWrite {
    pub key_space: KeySpace,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Accumulator of pending local store writes.
///
/// A batch is owned by a single writer. Nothing in it is visible to readers
/// until it is handed to [`LocalStore::flush`](crate::LocalStore::flush),
/// which publishes the whole batch in one call.
#[derive(Debug, Default)]
pub struct WriteBatch {
    writes: Vec<PendingWrite>,
}

impl WriteBatch {
    pub fn with_capacity(size_hint: usize) -> Self {
        Self {
            writes: Vec::with_capacity(size_hint),
        }
    }

    pub fn put(&mut self, key_space: KeySpace, key: &[u8], value: Vec<u8>) {
        self.writes.push(PendingWrite {
            key_space,
            key: key.to_vec(),
            value,
        });
    }

    /// Queue a tree under its own id.
    pub fn put_tree(&mut self, tree: &Tree) -> StoreResult<()> {
        let value = codec::encode_tree(tree)?;
        self.put(KeySpace::Tree, tree.id().as_bytes(), value);
        Ok(())
    }

    pub fn put_blob(&mut self, id: &ObjectId, blob: &Blob) {
        self.put(KeySpace::Blob, id.as_bytes(), codec::encode_blob(blob));
    }

    pub fn put_blob_metadata(&mut self, id: &ObjectId, metadata: &BlobMetadata) -> StoreResult<()> {
        let value = codec::encode_blob_metadata(metadata)?;
        self.put(KeySpace::BlobMetadata, id.as_bytes(), value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn into_writes(self) -> Vec<PendingWrite> {
        self.writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vos_types::ContentHash;

    #[test]
    fn typed_puts_land_in_their_key_space() {
        let mut batch = WriteBatch::with_capacity(3);
        let tree = Tree::empty(ObjectId::from(&b"tree"[..]));
        let blob_id = ObjectId::from(&b"blob"[..]);
        batch.put_tree(&tree).unwrap();
        batch.put_blob(&blob_id, &Blob::new(b"data".to_vec()));
        batch
            .put_blob_metadata(&blob_id, &BlobMetadata::new(ContentHash::from_bytes([0; 32]), 4))
            .unwrap();
        assert_eq!(batch.len(), 3);

        let spaces: Vec<KeySpace> = batch.into_writes().iter().map(|w| w.key_space).collect();
        assert_eq!(spaces, [KeySpace::Tree, KeySpace::Blob, KeySpace::BlobMetadata]);
    }

    #[test]
    fn new_batch_is_empty() {
        assert!(WriteBatch::default().is_empty());
    }
}
