use std::sync::Arc;

use vos_types::{Blob, BlobMetadata, FetchOrigin, Tree};

/// A tree fetch outcome: the tree, if any, and where it came from.
#[derive(Clone, Debug)]
pub struct GetTreeResult {
    pub tree: Option<Arc<Tree>>,
    pub origin: FetchOrigin,
}

impl GetTreeResult {
    pub fn found(tree: Arc<Tree>, origin: FetchOrigin) -> Self {
        Self {
            tree: Some(tree),
            origin,
        }
    }

    pub fn not_fetched() -> Self {
        Self {
            tree: None,
            origin: FetchOrigin::NotFetched,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GetBlobResult {
    pub blob: Option<Arc<Blob>>,
    pub origin: FetchOrigin,
}

impl GetBlobResult {
    pub fn found(blob: Arc<Blob>, origin: FetchOrigin) -> Self {
        Self {
            blob: Some(blob),
            origin,
        }
    }

    pub fn not_fetched() -> Self {
        Self {
            blob: None,
            origin: FetchOrigin::NotFetched,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GetBlobMetadataResult {
    pub metadata: Option<BlobMetadata>,
    pub origin: FetchOrigin,
}

impl GetBlobMetadataResult {
    pub fn found(metadata: BlobMetadata, origin: FetchOrigin) -> Self {
        Self {
            metadata: Some(metadata),
            origin,
        }
    }

    /// No metadata could be produced; a valid terminal state, not an error.
    pub fn not_fetched() -> Self {
        Self {
            metadata: None,
            origin: FetchOrigin::NotFetched,
        }
    }
}
