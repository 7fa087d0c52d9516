//! Value encodings for each key space.
//!
//! Trees are stored as JSON, blob metadata as bincode, and blobs as their raw
//! bytes. Decoders check what they can (a tree must carry the id it is keyed
//! by) and report anything else as [`StoreError::Corrupt`].

use vos_types::{Blob, BlobMetadata, ObjectId, Tree};

use crate::error::{StoreError, StoreResult};
use crate::keyspace::KeySpace;

pub fn encode_tree(tree: &Tree) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(tree).map_err(|e| StoreError::Serialization(e.to_string()))
}

pub fn decode_tree(id: &ObjectId, data: &[u8]) -> StoreResult<Tree> {
    let tree: Tree = serde_json::from_slice(data).map_err(|e| StoreError::Corrupt {
        key_space: KeySpace::Tree,
        reason: e.to_string(),
    })?;
    if tree.id() != id {
        return Err(StoreError::Corrupt {
            key_space: KeySpace::Tree,
            reason: format!("tree stored under {id} claims id {}", tree.id()),
        });
    }
    Ok(tree)
}

pub fn encode_blob(blob: &Blob) -> Vec<u8> {
    blob.contents().to_vec()
}

pub fn decode_blob(data: Vec<u8>) -> Blob {
    Blob::new(data)
}

pub fn encode_blob_metadata(metadata: &BlobMetadata) -> StoreResult<Vec<u8>> {
    bincode::serialize(metadata).map_err(|e| StoreError::Serialization(e.to_string()))
}

pub fn decode_blob_metadata(data: &[u8]) -> StoreResult<BlobMetadata> {
    bincode::deserialize(data).map_err(|e| StoreError::Corrupt {
        key_space: KeySpace::BlobMetadata,
        reason: e.to_string(),
    })
}
