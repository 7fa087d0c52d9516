use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use vos_backing::{
    BackingResult, BackingStore, FetchContext, GetBlobMetadataResult, GetBlobResult, GetTreeResult,
};
use vos_crypto::ContentHasher;
use vos_store::{LocalStore, StoreResult};
use vos_types::{
    BlobMetadata, FetchOrigin, ObjectComparison, ObjectId, RootId, Tree, TreeEntry, TreeEntryType,
};

use crate::config::{CacheConfig, WriteThroughMode};
use crate::error::CacheResult;
use crate::fallback::{MetadataTier, TierOutcome, METADATA_FALLBACK};
use crate::policy::{CachingPolicy, ObjectKind};
use crate::stats::{CacheStats, Counter};
use crate::writer::WriteThrough;

/// A [`BackingStore`] that persists what it fetches into a [`LocalStore`].
///
/// Every fetch first consults the local store (when the policy covers the
/// object kind), then falls back to the wrapped backing store and writes the
/// result through. Identifiers name immutable content, so concurrent misses
/// for the same id simply fetch and write the same value twice; no locking
/// is needed beyond the local store's own.
///
/// Handles to the backing store, local store and stats are shared; wrap the
/// caching layer itself in an `Arc` to use it from spawned tasks.
pub struct CachedBackingStore {
    backing: Arc<dyn BackingStore>,
    local: Arc<dyn LocalStore>,
    stats: Arc<CacheStats>,
    policy: CachingPolicy,
    writer: WriteThrough,
}

impl CachedBackingStore {
    /// Wrap `backing`, caching the kinds in `policy` into `local`.
    pub fn new(
        backing: Arc<dyn BackingStore>,
        local: Arc<dyn LocalStore>,
        stats: Arc<CacheStats>,
        policy: CachingPolicy,
    ) -> Self {
        let writer = WriteThrough::new(Arc::clone(&local), Arc::clone(&stats), WriteThroughMode::Inline);
        Self {
            backing,
            local,
            stats,
            policy,
            writer,
        }
    }

    /// Build from a [`CacheConfig`]; fails if the configured policy is empty.
    pub fn from_config(
        backing: Arc<dyn BackingStore>,
        local: Arc<dyn LocalStore>,
        stats: Arc<CacheStats>,
        config: &CacheConfig,
    ) -> CacheResult<Self> {
        let policy = config.policy()?;
        Ok(Self::new(backing, local, stats, policy).with_write_through(config.write_through))
    }

    pub fn with_write_through(mut self, mode: WriteThroughMode) -> Self {
        self.writer = WriteThrough::new(Arc::clone(&self.local), Arc::clone(&self.stats), mode);
        self
    }

    pub fn should_cache(&self, kind: ObjectKind) -> bool {
        self.policy.should_cache(kind)
    }

    pub fn policy(&self) -> CachingPolicy {
        self.policy
    }

    pub fn stats(&self) -> &Arc<CacheStats> {
        &self.stats
    }

    /// The wrapped backing store, for operations that must bypass the cache.
    pub fn backing_store(&self) -> &Arc<dyn BackingStore> {
        &self.backing
    }

    pub fn local_store(&self) -> &Arc<dyn LocalStore> {
        &self.local
    }

    /// Turn a local store read into a hit or a miss; faults count as misses.
    fn read_or_miss<T>(&self, kind: ObjectKind, id: &ObjectId, read: StoreResult<Option<T>>) -> Option<T> {
        match read {
            Ok(value) => value,
            Err(e) => {
                self.stats.increment(Counter::LocalStoreReadFailure);
                warn!(%id, key_space = %kind.key_space(), error = %e, "local store read failed; treating as miss");
                None
            }
        }
    }

    /// Queue `tree` and any blob metadata carried inline by its entries.
    async fn write_tree(&self, tree: &Tree) {
        let mut batch = self.writer.begin(tree.len() + 1);
        if self.should_cache(ObjectKind::Trees) {
            if let Err(e) = batch.put_tree(tree) {
                self.writer.encode_failed(&e);
            }
        }
        if self.should_cache(ObjectKind::BlobMetadata) {
            for (_, entry) in tree.iter() {
                if let Some(metadata) = inline_metadata(entry) {
                    if let Err(e) = batch.put_blob_metadata(&entry.object_id, &metadata) {
                        self.writer.encode_failed(&e);
                    }
                }
            }
        }
        self.writer.flush(batch).await;
    }

    async fn write_blob_metadata(&self, id: &ObjectId, metadata: &BlobMetadata) {
        if !self.should_cache(ObjectKind::BlobMetadata) {
            return;
        }
        let mut batch = self.writer.begin(1);
        match batch.put_blob_metadata(id, metadata) {
            Ok(()) => self.writer.flush(batch).await,
            Err(e) => self.writer.encode_failed(&e),
        }
    }

    async fn fetch_metadata_from(
        &self,
        tier: MetadataTier,
        id: &ObjectId,
        context: &FetchContext,
    ) -> BackingResult<TierOutcome> {
        match tier {
            MetadataTier::BackingStore => {
                let result = self.backing.get_blob_metadata(id, context).await?;
                let Some(metadata) = result.metadata else {
                    return Ok(TierOutcome::Next);
                };
                if result.origin == FetchOrigin::FromDiskCache {
                    self.stats.increment(Counter::LocalBlobMetadataFromBackingStore);
                } else {
                    self.stats.increment(Counter::BlobMetadataFromBackingStore);
                }
                Ok(TierOutcome::Found(metadata, result.origin))
            }
            MetadataTier::DeriveFromBlob => {
                let result = self.get_blob(id, context).await?;
                let Some(blob) = result.blob else {
                    return Ok(TierOutcome::Next);
                };
                self.stats.increment(Counter::BlobMetadataFromBlob);
                debug!(%id, "derived blob metadata from blob contents");
                Ok(TierOutcome::Found(
                    ContentHasher::BLOB.blob_metadata(&blob),
                    result.origin,
                ))
            }
        }
    }
}

/// Metadata a regular-file entry carries inline, if it carries both halves.
fn inline_metadata(entry: &TreeEntry) -> Option<BlobMetadata> {
    if entry.entry_type != TreeEntryType::Regular {
        return None;
    }
    Some(BlobMetadata::new(entry.content_hash?, entry.size?))
}

#[async_trait]
impl BackingStore for CachedBackingStore {
    fn compare_objects_by_id(&self, one: &ObjectId, two: &ObjectId) -> ObjectComparison {
        self.backing.compare_objects_by_id(one, two)
    }

    /// Root resolution always goes to the backing store; the resolved tree is
    /// then cached whatever the policy says, since resolving is the
    /// expensive part.
    async fn get_root_tree(&self, root_id: &RootId, context: &FetchContext) -> BackingResult<Arc<Tree>> {
        let tree = self.backing.get_root_tree(root_id, context).await?;
        let mut batch = self.writer.begin(1);
        match batch.put_tree(&tree) {
            Ok(()) => self.writer.flush(batch).await,
            Err(e) => self.writer.encode_failed(&e),
        }
        Ok(tree)
    }

    async fn get_tree_entry_for_object_id(
        &self,
        id: &ObjectId,
        entry_type: TreeEntryType,
        context: &FetchContext,
    ) -> BackingResult<Option<TreeEntry>> {
        self.backing
            .get_tree_entry_for_object_id(id, entry_type, context)
            .await
    }

    async fn get_tree(&self, id: &ObjectId, context: &FetchContext) -> BackingResult<GetTreeResult> {
        if self.should_cache(ObjectKind::Trees) {
            let read = self.local.get_tree(id).await;
            if let Some(tree) = self.read_or_miss(ObjectKind::Trees, id, read) {
                self.stats.increment(Counter::TreeFromLocalStore);
                debug!(%id, "tree served from local store");
                return Ok(GetTreeResult::found(Arc::new(tree), FetchOrigin::FromDiskCache));
            }
        }

        let result = self.backing.get_tree(id, context).await?;
        if let Some(tree) = &result.tree {
            self.write_tree(tree).await;
            self.stats.increment(Counter::TreeFromBackingStore);
        }
        Ok(result)
    }

    async fn get_blob(&self, id: &ObjectId, context: &FetchContext) -> BackingResult<GetBlobResult> {
        if self.should_cache(ObjectKind::Blobs) {
            let read = self.local.get_blob(id).await;
            if let Some(blob) = self.read_or_miss(ObjectKind::Blobs, id, read) {
                self.stats.increment(Counter::BlobFromLocalStore);
                debug!(%id, "blob served from local store");
                return Ok(GetBlobResult::found(Arc::new(blob), FetchOrigin::FromDiskCache));
            }
        }

        let result = self.backing.get_blob(id, context).await?;
        if let Some(blob) = &result.blob {
            if self.should_cache(ObjectKind::Blobs) {
                let mut batch = self.writer.begin(1);
                batch.put_blob(id, blob);
                self.writer.flush(batch).await;
            }
            self.stats.increment(Counter::BlobFromBackingStore);
        }
        Ok(result)
    }

    async fn get_blob_metadata(
        &self,
        id: &ObjectId,
        context: &FetchContext,
    ) -> BackingResult<GetBlobMetadataResult> {
        if self.should_cache(ObjectKind::BlobMetadata) {
            let read = self.local.get_blob_metadata(id).await;
            if let Some(metadata) = self.read_or_miss(ObjectKind::BlobMetadata, id, read) {
                self.stats.increment(Counter::BlobMetadataFromLocalStore);
                debug!(%id, "blob metadata served from local store");
                return Ok(GetBlobMetadataResult::found(metadata, FetchOrigin::FromDiskCache));
            }
        }

        for tier in METADATA_FALLBACK {
            if let TierOutcome::Found(metadata, origin) =
                self.fetch_metadata_from(tier, id, context).await?
            {
                self.write_blob_metadata(id, &metadata).await;
                return Ok(GetBlobMetadataResult::found(metadata, origin));
            }
        }
        debug!(%id, "no tier could supply blob metadata");
        Ok(GetBlobMetadataResult::not_fetched())
    }

    async fn prefetch_blobs(&self, ids: &[ObjectId], context: &FetchContext) -> BackingResult<()> {
        self.backing.prefetch_blobs(ids, context).await
    }

    fn periodic_management_task(&self) {
        self.backing.periodic_management_task();
    }

    fn start_recording_fetch(&self) {
        self.backing.start_recording_fetch();
    }

    fn stop_recording_fetch(&self) -> HashSet<String> {
        self.backing.stop_recording_fetch()
    }

    async fn import_manifest_for_root(&self, root_id: &RootId, manifest: &ObjectId) -> BackingResult<()> {
        self.backing.import_manifest_for_root(root_id, manifest).await
    }

    fn parse_root_id(&self, root_id: &str) -> BackingResult<RootId> {
        self.backing.parse_root_id(root_id)
    }

    fn render_root_id(&self, root_id: &RootId) -> String {
        self.backing.render_root_id(root_id)
    }

    fn parse_object_id(&self, object_id: &str) -> BackingResult<ObjectId> {
        self.backing.parse_object_id(object_id)
    }

    fn render_object_id(&self, object_id: &ObjectId) -> String {
        self.backing.render_object_id(object_id)
    }

    fn repo_name(&self) -> Option<String> {
        self.backing.repo_name()
    }

    fn drop_all_pending_requests(&self) -> u64 {
        self.backing.drop_all_pending_requests()
    }
}

impl std::fmt::Debug for CachedBackingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedBackingStore")
            .field("policy", &self.policy)
            .field("write_through", &self.writer.mode())
            .finish()
    }
}
