use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::hash::ContentHash;

/// Raw file contents named by an [`ObjectId`](crate::ObjectId).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    contents: Bytes,
}

impl Blob {
    pub fn new(contents: impl Into<Bytes>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    pub fn contents(&self) -> &Bytes {
        &self.contents
    }

    /// Size of the contents in bytes.
    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }
}

/// Lightweight summary of a blob: its content hash and size.
///
/// Whether reported by the backing source or derived by hashing a fetched
/// [`Blob`], metadata for a given id must always describe the same bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetadata {
    pub content_hash: ContentHash,
    pub size: u64,
}

impl BlobMetadata {
    pub fn new(content_hash: ContentHash, size: u64) -> Self {
        Self { content_hash, size }
    }
}
