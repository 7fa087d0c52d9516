use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by the caching layer.
///
/// Counter names are stable; tooling reads them from
/// [`CacheStats::snapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Counter {
    TreeFromLocalStore,
    TreeFromBackingStore,
    BlobFromLocalStore,
    BlobFromBackingStore,
    BlobMetadataFromLocalStore,
    /// Metadata the backing store fetched from a remote tier.
    BlobMetadataFromBackingStore,
    /// Metadata the backing store itself served from its disk cache.
    LocalBlobMetadataFromBackingStore,
    /// Metadata computed by hashing a fetched blob.
    BlobMetadataFromBlob,
    LocalStoreReadFailure,
    LocalStoreWriteFailure,
}

impl Counter {
    pub const ALL: [Counter; 10] = [
        Counter::TreeFromLocalStore,
        Counter::TreeFromBackingStore,
        Counter::BlobFromLocalStore,
        Counter::BlobFromBackingStore,
        Counter::BlobMetadataFromLocalStore,
        Counter::BlobMetadataFromBackingStore,
        Counter::LocalBlobMetadataFromBackingStore,
        Counter::BlobMetadataFromBlob,
        Counter::LocalStoreReadFailure,
        Counter::LocalStoreWriteFailure,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::TreeFromLocalStore => "tree-from-cache",
            Self::TreeFromBackingStore => "tree-from-backing-store",
            Self::BlobFromLocalStore => "blob-from-cache",
            Self::BlobFromBackingStore => "blob-from-backing-store",
            Self::BlobMetadataFromLocalStore => "metadata-from-cache",
            Self::BlobMetadataFromBackingStore => "metadata-from-backing-store",
            Self::LocalBlobMetadataFromBackingStore => "metadata-from-backing-store-cache",
            Self::BlobMetadataFromBlob => "metadata-from-blob",
            Self::LocalStoreReadFailure => "local-store-read-failure",
            Self::LocalStoreWriteFailure => "local-store-write-failure",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Lock-free statistics sink shared by every request of a caching layer.
#[derive(Debug, Default)]
pub struct CacheStats {
    counters: [AtomicU64; Counter::ALL.len()],
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, counter: Counter) {
        self.counters[counter.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.counters[counter.index()].load(Ordering::Relaxed)
    }

    /// Current value of every counter, keyed by counter name.
    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        Counter::ALL
            .into_iter()
            .map(|counter| (counter.name(), self.get(counter)))
            .collect()
    }
}
