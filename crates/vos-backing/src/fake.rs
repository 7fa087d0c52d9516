use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use vos_crypto::ContentHasher;
use vos_types::{
    Blob, BlobMetadata, FetchOrigin, ObjectComparison, ObjectId, RootId, Tree, TreeEntry,
    TreeEntryType,
};

use crate::context::FetchContext;
use crate::error::{BackingError, BackingResult};
use crate::result::{GetBlobMetadataResult, GetBlobResult, GetTreeResult};
use crate::traits::BackingStore;

/// Operations counted by [`FakeBackingStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FakeOp {
    GetRootTree,
    GetTreeEntry,
    GetTree,
    GetBlob,
    GetBlobMetadata,
    PrefetchBlobs,
    ImportManifest,
}

impl FakeOp {
    const COUNT: usize = 7;

    fn index(self) -> usize {
        self as usize
    }
}

/// How a poisoned id fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FakeFailure {
    Transport,
    Cancelled,
}

#[derive(Default)]
struct FakeState {
    trees: HashMap<ObjectId, Arc<Tree>>,
    blobs: HashMap<ObjectId, Arc<Blob>>,
    metadata: HashMap<ObjectId, BlobMetadata>,
    roots: HashMap<RootId, ObjectId>,
    manifests: HashMap<RootId, ObjectId>,
    absent: HashSet<ObjectId>,
    failures: HashMap<ObjectId, FakeFailure>,
    prefetched: Vec<ObjectId>,
}

/// In-memory backing store for tests.
///
/// Objects are registered up front. Unknown ids fail with
/// [`BackingError::NotFound`], except ids registered with
/// [`mark_absent`](Self::mark_absent), which produce empty `NotFetched`
/// results. Every fetch is counted per [`FakeOp`], and ids can be poisoned
/// to fail with a transport error or a cancellation.
pub struct FakeBackingStore {
    state: RwLock<FakeState>,
    calls: [AtomicU64; FakeOp::COUNT],
    origin: RwLock<FetchOrigin>,
    latency: RwLock<Option<Duration>>,
    recording: Mutex<Option<HashSet<String>>>,
    maintenance_runs: AtomicU64,
    repo_name: Option<String>,
}

impl FakeBackingStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(FakeState::default()),
            calls: Default::default(),
            origin: RwLock::new(FetchOrigin::REMOTE),
            latency: RwLock::new(None),
            recording: Mutex::new(None),
            maintenance_runs: AtomicU64::new(0),
            repo_name: None,
        }
    }

    pub fn with_repo_name(mut self, name: impl Into<String>) -> Self {
        self.repo_name = Some(name.into());
        self
    }

    /// Origin reported for every object this store returns.
    pub fn set_origin(&self, origin: FetchOrigin) {
        *self.origin.write().expect("lock poisoned") = origin;
    }

    /// Delay every fetch by `latency` before answering.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.write().expect("lock poisoned") = Some(latency);
    }

    pub fn put_tree(&self, tree: Tree) {
        let mut state = self.state.write().expect("lock poisoned");
        state.trees.insert(tree.id().clone(), Arc::new(tree));
    }

    /// Register a blob without direct metadata.
    pub fn put_blob(&self, id: ObjectId, blob: Blob) {
        let mut state = self.state.write().expect("lock poisoned");
        state.blobs.insert(id, Arc::new(blob));
    }

    /// Register directly-served metadata for an id.
    pub fn put_blob_metadata(&self, id: ObjectId, metadata: BlobMetadata) {
        let mut state = self.state.write().expect("lock poisoned");
        state.metadata.insert(id, metadata);
    }

    /// Register a blob together with its directly-served metadata, returning
    /// that metadata.
    pub fn put_file(&self, id: ObjectId, contents: impl Into<Vec<u8>>) -> BlobMetadata {
        let blob = Blob::new(contents.into());
        let metadata = ContentHasher::BLOB.blob_metadata(&blob);
        let mut state = self.state.write().expect("lock poisoned");
        state.blobs.insert(id.clone(), Arc::new(blob));
        state.metadata.insert(id, metadata);
        metadata
    }

    pub fn put_root(&self, root_id: RootId, tree: Tree) {
        let tree_id = tree.id().clone();
        self.put_tree(tree);
        let mut state = self.state.write().expect("lock poisoned");
        state.roots.insert(root_id, tree_id);
    }

    /// Make fetches of `id` succeed with an empty `NotFetched` result.
    pub fn mark_absent(&self, id: ObjectId) {
        self.state.write().expect("lock poisoned").absent.insert(id);
    }

    /// Make every fetch of `id` fail.
    pub fn fail_with(&self, id: ObjectId, failure: FakeFailure) {
        self.state
            .write()
            .expect("lock poisoned")
            .failures
            .insert(id, failure);
    }

    pub fn clear_failure(&self, id: &ObjectId) {
        self.state.write().expect("lock poisoned").failures.remove(id);
    }

    pub fn calls(&self, op: FakeOp) -> u64 {
        self.calls[op.index()].load(Ordering::Relaxed)
    }

    pub fn prefetched(&self) -> Vec<ObjectId> {
        self.state.read().expect("lock poisoned").prefetched.clone()
    }

    pub fn manifest_for(&self, root_id: &RootId) -> Option<ObjectId> {
        self.state
            .read()
            .expect("lock poisoned")
            .manifests
            .get(root_id)
            .cloned()
    }

    pub fn maintenance_runs(&self) -> u64 {
        self.maintenance_runs.load(Ordering::Relaxed)
    }

    async fn begin(&self, op: FakeOp) {
        self.calls[op.index()].fetch_add(1, Ordering::Relaxed);
        let latency = *self.latency.read().expect("lock poisoned");
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn origin(&self) -> FetchOrigin {
        *self.origin.read().expect("lock poisoned")
    }

    fn check_failure(&self, id: &ObjectId) -> BackingResult<()> {
        match self.state.read().expect("lock poisoned").failures.get(id) {
            Some(FakeFailure::Transport) => Err(BackingError::Transport(format!(
                "injected failure for {id}"
            ))),
            Some(FakeFailure::Cancelled) => Err(BackingError::Cancelled),
            None => Ok(()),
        }
    }

    fn is_absent(&self, id: &ObjectId) -> bool {
        self.state.read().expect("lock poisoned").absent.contains(id)
    }

    fn record(&self, id: &ObjectId) {
        if let Some(fetched) = self.recording.lock().expect("lock poisoned").as_mut() {
            fetched.insert(id.to_hex());
        }
    }
}

impl Default for FakeBackingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackingStore for FakeBackingStore {
    fn compare_objects_by_id(&self, one: &ObjectId, two: &ObjectId) -> ObjectComparison {
        if one == two {
            ObjectComparison::Identical
        } else {
            ObjectComparison::Different
        }
    }

    async fn get_root_tree(
        &self,
        root_id: &RootId,
        _context: &FetchContext,
    ) -> BackingResult<Arc<Tree>> {
        self.begin(FakeOp::GetRootTree).await;
        let state = self.state.read().expect("lock poisoned");
        state
            .roots
            .get(root_id)
            .and_then(|tree_id| state.trees.get(tree_id))
            .cloned()
            .ok_or_else(|| BackingError::RootNotFound(root_id.clone()))
    }

    async fn get_tree_entry_for_object_id(
        &self,
        id: &ObjectId,
        entry_type: TreeEntryType,
        _context: &FetchContext,
    ) -> BackingResult<Option<TreeEntry>> {
        self.begin(FakeOp::GetTreeEntry).await;
        self.check_failure(id)?;
        let state = self.state.read().expect("lock poisoned");
        let entry = match entry_type {
            TreeEntryType::Directory => state
                .trees
                .contains_key(id)
                .then(|| TreeEntry::new(entry_type, id.clone())),
            _ if state.blobs.contains_key(id) => {
                let mut entry = TreeEntry::new(entry_type, id.clone());
                if let Some(meta) = state.metadata.get(id) {
                    entry.size = Some(meta.size);
                    entry.content_hash = Some(meta.content_hash);
                }
                Some(entry)
            }
            _ => None,
        };
        Ok(entry)
    }

    async fn get_tree(&self, id: &ObjectId, _context: &FetchContext) -> BackingResult<GetTreeResult> {
        self.begin(FakeOp::GetTree).await;
        self.check_failure(id)?;
        if self.is_absent(id) {
            return Ok(GetTreeResult::not_fetched());
        }
        let tree = self.state.read().expect("lock poisoned").trees.get(id).cloned();
        match tree {
            Some(tree) => Ok(GetTreeResult::found(tree, self.origin())),
            None => Err(BackingError::NotFound {
                kind: "tree",
                id: id.clone(),
            }),
        }
    }

    async fn get_blob(&self, id: &ObjectId, _context: &FetchContext) -> BackingResult<GetBlobResult> {
        self.begin(FakeOp::GetBlob).await;
        self.check_failure(id)?;
        if self.is_absent(id) {
            return Ok(GetBlobResult::not_fetched());
        }
        let blob = self.state.read().expect("lock poisoned").blobs.get(id).cloned();
        match blob {
            Some(blob) => {
                self.record(id);
                Ok(GetBlobResult::found(blob, self.origin()))
            }
            None => Err(BackingError::NotFound {
                kind: "blob",
                id: id.clone(),
            }),
        }
    }

    async fn get_blob_metadata(
        &self,
        id: &ObjectId,
        _context: &FetchContext,
    ) -> BackingResult<GetBlobMetadataResult> {
        self.begin(FakeOp::GetBlobMetadata).await;
        self.check_failure(id)?;
        let metadata = self.state.read().expect("lock poisoned").metadata.get(id).copied();
        Ok(match metadata {
            Some(metadata) => GetBlobMetadataResult::found(metadata, self.origin()),
            None => GetBlobMetadataResult::not_fetched(),
        })
    }

    async fn prefetch_blobs(&self, ids: &[ObjectId], _context: &FetchContext) -> BackingResult<()> {
        self.begin(FakeOp::PrefetchBlobs).await;
        for id in ids {
            self.check_failure(id)?;
        }
        let mut state = self.state.write().expect("lock poisoned");
        state.prefetched.extend(ids.iter().cloned());
        debug!(count = ids.len(), "prefetched blobs");
        Ok(())
    }

    fn periodic_management_task(&self) {
        self.maintenance_runs.fetch_add(1, Ordering::Relaxed);
    }

    fn start_recording_fetch(&self) {
        *self.recording.lock().expect("lock poisoned") = Some(HashSet::new());
    }

    fn stop_recording_fetch(&self) -> HashSet<String> {
        self.recording
            .lock()
            .expect("lock poisoned")
            .take()
            .unwrap_or_default()
    }

    async fn import_manifest_for_root(
        &self,
        root_id: &RootId,
        manifest: &ObjectId,
    ) -> BackingResult<()> {
        self.begin(FakeOp::ImportManifest).await;
        let mut state = self.state.write().expect("lock poisoned");
        state.manifests.insert(root_id.clone(), manifest.clone());
        Ok(())
    }

    fn parse_root_id(&self, root_id: &str) -> BackingResult<RootId> {
        if root_id.is_empty() {
            return Err(BackingError::InvalidId("empty root id".into()));
        }
        Ok(RootId::new(root_id))
    }

    fn render_root_id(&self, root_id: &RootId) -> String {
        root_id.as_str().to_string()
    }

    fn parse_object_id(&self, object_id: &str) -> BackingResult<ObjectId> {
        ObjectId::from_hex(object_id).map_err(|e| BackingError::InvalidId(e.to_string()))
    }

    fn render_object_id(&self, object_id: &ObjectId) -> String {
        object_id.to_hex()
    }

    fn repo_name(&self) -> Option<String> {
        self.repo_name.clone()
    }

    fn drop_all_pending_requests(&self) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &'static [u8]) -> ObjectId {
        ObjectId::from(s)
    }

    #[tokio::test]
    async fn unknown_tree_is_not_found() {
        let store = FakeBackingStore::new();
        let err = store
            .get_tree(&id(b"missing"), &FetchContext::null())
            .await
            .unwrap_err();
        assert!(matches!(err, BackingError::NotFound { kind: "tree", .. }));
        assert_eq!(store.calls(FakeOp::GetTree), 1);
    }

    #[tokio::test]
    async fn absent_blob_is_empty() {
        let store = FakeBackingStore::new();
        store.mark_absent(id(b"gone"));
        let result = store.get_blob(&id(b"gone"), &FetchContext::null()).await.unwrap();
        assert!(result.blob.is_none());
        assert_eq!(result.origin, FetchOrigin::NotFetched);
    }

    #[tokio::test]
    async fn put_file_serves_blob_and_metadata() {
        let store = FakeBackingStore::new();
        let meta = store.put_file(id(b"f"), b"hello".to_vec());
        assert_eq!(meta.size, 5);

        let ctx = FetchContext::null();
        let blob = store.get_blob(&id(b"f"), &ctx).await.unwrap();
        assert_eq!(blob.blob.unwrap().contents().as_ref(), b"hello");
        assert_eq!(blob.origin, FetchOrigin::REMOTE);

        let direct = store.get_blob_metadata(&id(b"f"), &ctx).await.unwrap();
        assert_eq!(direct.metadata, Some(meta));
    }

    #[tokio::test]
    async fn blob_without_metadata_reports_empty_metadata() {
        let store = FakeBackingStore::new();
        store.put_blob(id(b"b"), Blob::new(b"x".to_vec()));
        let result = store
            .get_blob_metadata(&id(b"b"), &FetchContext::null())
            .await
            .unwrap();
        assert!(result.metadata.is_none());
        assert_eq!(result.origin, FetchOrigin::NotFetched);
    }

    #[tokio::test]
    async fn injected_failures() {
        let store = FakeBackingStore::new();
        store.put_blob(id(b"b"), Blob::new(b"x".to_vec()));
        store.fail_with(id(b"b"), FakeFailure::Cancelled);
        let err = store.get_blob(&id(b"b"), &FetchContext::null()).await.unwrap_err();
        assert!(matches!(err, BackingError::Cancelled));

        store.fail_with(id(b"b"), FakeFailure::Transport);
        let err = store.get_blob(&id(b"b"), &FetchContext::null()).await.unwrap_err();
        assert!(matches!(err, BackingError::Transport(_)));

        store.clear_failure(&id(b"b"));
        assert!(store.get_blob(&id(b"b"), &FetchContext::null()).await.is_ok());
    }

    #[tokio::test]
    async fn root_resolution() {
        let store = FakeBackingStore::new();
        store.put_root(RootId::new("c1"), Tree::empty(id(b"root-tree")));
        let tree = store
            .get_root_tree(&RootId::new("c1"), &FetchContext::null())
            .await
            .unwrap();
        assert_eq!(tree.id(), &id(b"root-tree"));
        assert!(matches!(
            store
                .get_root_tree(&RootId::new("c2"), &FetchContext::null())
                .await,
            Err(BackingError::RootNotFound(_))
        ));
    }

    #[tokio::test]
    async fn tree_entry_carries_inline_metadata() {
        let store = FakeBackingStore::new();
        let meta = store.put_file(id(b"f"), b"abc".to_vec());
        let entry = store
            .get_tree_entry_for_object_id(&id(b"f"), TreeEntryType::Regular, &FetchContext::null())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.size, Some(3));
        assert_eq!(entry.content_hash, Some(meta.content_hash));

        let none = store
            .get_tree_entry_for_object_id(&id(b"f"), TreeEntryType::Directory, &FetchContext::null())
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn recording_collects_fetched_blobs() {
        let store = FakeBackingStore::new();
        store.put_blob(id(b"a"), Blob::new(b"1".to_vec()));
        store.put_blob(id(b"b"), Blob::new(b"2".to_vec()));
        let ctx = FetchContext::null();

        store.get_blob(&id(b"a"), &ctx).await.unwrap();
        store.start_recording_fetch();
        store.get_blob(&id(b"b"), &ctx).await.unwrap();
        let fetched = store.stop_recording_fetch();
        assert_eq!(fetched, HashSet::from([id(b"b").to_hex()]));
        assert!(store.stop_recording_fetch().is_empty());
    }

    #[test]
    fn id_parsing() {
        let store = FakeBackingStore::new().with_repo_name("fbsource");
        let parsed = store.parse_object_id("abcd").unwrap();
        assert_eq!(store.render_object_id(&parsed), "abcd");
        assert!(store.parse_object_id("xyz").is_err());
        assert!(store.parse_root_id("").is_err());
        assert_eq!(store.repo_name().as_deref(), Some("fbsource"));
    }
}
