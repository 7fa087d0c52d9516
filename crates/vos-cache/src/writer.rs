use std::sync::Arc;

use tracing::{debug, warn};
use vos_store::{LocalStore, StoreError, WriteBatch};

use crate::config::WriteThroughMode;
use crate::stats::{CacheStats, Counter};

/// Best-effort path from fetched objects into the local store.
///
/// Nothing here returns an error: failures are counted as
/// [`Counter::LocalStoreWriteFailure`] and logged. Background flushes run on
/// a spawned task holding its own handles to the store and stats, so they
/// outlive the request that issued them.
#[derive(Clone)]
pub struct WriteThrough {
    store: Arc<dyn LocalStore>,
    stats: Arc<CacheStats>,
    mode: WriteThroughMode,
}

impl WriteThrough {
    pub fn new(store: Arc<dyn LocalStore>, stats: Arc<CacheStats>, mode: WriteThroughMode) -> Self {
        Self { store, stats, mode }
    }

    pub fn mode(&self) -> WriteThroughMode {
        self.mode
    }

    pub fn begin(&self, size_hint: usize) -> WriteBatch {
        self.store.begin_write(size_hint)
    }

    /// Record a value that could not be queued because it failed to encode.
    pub fn encode_failed(&self, error: &StoreError) {
        self.stats.increment(Counter::LocalStoreWriteFailure);
        warn!(error = %error, "failed to encode value for local store");
    }

    /// Flush `batch` according to the configured mode.
    pub async fn flush(&self, batch: WriteBatch) {
        if batch.is_empty() {
            return;
        }
        match (self.mode, tokio::runtime::Handle::try_current()) {
            (WriteThroughMode::Background, Ok(handle)) => {
                let store = Arc::clone(&self.store);
                let stats = Arc::clone(&self.stats);
                handle.spawn(async move { apply(store.as_ref(), &stats, batch).await });
            }
            _ => apply(self.store.as_ref(), &self.stats, batch).await,
        }
    }
}

async fn apply(store: &dyn LocalStore, stats: &CacheStats, batch: WriteBatch) {
    let count = batch.len();
    match store.flush(batch).await {
        Ok(()) => debug!(count, "write-through flushed"),
        Err(e) => {
            stats.increment(Counter::LocalStoreWriteFailure);
            warn!(count, error = %e, "write-through to local store failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vos_store::{KeySpace, MemoryLocalStore};

    fn writer(mode: WriteThroughMode) -> (Arc<MemoryLocalStore>, Arc<CacheStats>, WriteThrough) {
        let store = Arc::new(MemoryLocalStore::new());
        let stats = Arc::new(CacheStats::new());
        let writer = WriteThrough::new(store.clone(), stats.clone(), mode);
        (store, stats, writer)
    }

    #[tokio::test]
    async fn inline_flush_is_visible_on_return() {
        let (store, stats, writer) = writer(WriteThroughMode::Inline);
        let mut batch = writer.begin(1);
        batch.put(KeySpace::Blob, b"k", b"v".to_vec());
        writer.flush(batch).await;
        assert!(store.contains(KeySpace::Blob, b"k"));
        assert_eq!(stats.get(Counter::LocalStoreWriteFailure), 0);
    }

    #[tokio::test]
    async fn failed_flush_is_counted_not_returned() {
        let (store, stats, writer) = writer(WriteThroughMode::Inline);
        store.set_fail_writes(true);
        let mut batch = writer.begin(1);
        batch.put(KeySpace::Blob, b"k", b"v".to_vec());
        writer.flush(batch).await;
        assert_eq!(stats.get(Counter::LocalStoreWriteFailure), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn empty_batch_is_skipped() {
        let (store, stats, writer) = writer(WriteThroughMode::Inline);
        store.set_fail_writes(true);
        writer.flush(writer.begin(0)).await;
        assert_eq!(stats.get(Counter::LocalStoreWriteFailure), 0);
    }

    #[tokio::test]
    async fn background_flush_lands_eventually() {
        let (store, _stats, writer) = writer(WriteThroughMode::Background);
        let mut batch = writer.begin(1);
        batch.put(KeySpace::Tree, b"t", b"v".to_vec());
        writer.flush(batch).await;
        drop(writer);

        let landed = tokio::time::timeout(Duration::from_secs(5), async {
            while !store.contains(KeySpace::Tree, b"t") {
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(landed.is_ok());
    }
}
