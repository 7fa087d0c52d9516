use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use vos_types::{ObjectComparison, ObjectId, RootId, Tree, TreeEntry, TreeEntryType};

use crate::context::FetchContext;
use crate::error::BackingResult;
use crate::result::{GetBlobMetadataResult, GetBlobResult, GetTreeResult};

/// Authoritative source of filesystem objects.
///
/// Layers that wrap a backing store (caches, filters) implement this same
/// trait so that callers can substitute one for the other. Fetch operations
/// return either an object paired with its [`FetchOrigin`], an empty result
/// tagged `NotFetched`, or a [`BackingError`].
///
/// [`FetchOrigin`]: vos_types::FetchOrigin
/// [`BackingError`]: crate::BackingError
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Compare two ids without fetching either object.
    fn compare_objects_by_id(&self, one: &ObjectId, two: &ObjectId) -> ObjectComparison;

    /// Resolve a root to its tree.
    async fn get_root_tree(
        &self,
        root_id: &RootId,
        context: &FetchContext,
    ) -> BackingResult<Arc<Tree>>;

    /// Build a standalone tree entry for an object of a known type.
    async fn get_tree_entry_for_object_id(
        &self,
        id: &ObjectId,
        entry_type: TreeEntryType,
        context: &FetchContext,
    ) -> BackingResult<Option<TreeEntry>>;

    async fn get_tree(&self, id: &ObjectId, context: &FetchContext) -> BackingResult<GetTreeResult>;

    async fn get_blob(&self, id: &ObjectId, context: &FetchContext) -> BackingResult<GetBlobResult>;

    /// Fetch blob metadata directly. Sources that cannot supply metadata
    /// without the blob return an empty result.
    async fn get_blob_metadata(
        &self,
        id: &ObjectId,
        context: &FetchContext,
    ) -> BackingResult<GetBlobMetadataResult>;

    /// Hint that the given blobs will be needed soon.
    async fn prefetch_blobs(&self, ids: &[ObjectId], context: &FetchContext) -> BackingResult<()>;

    /// Periodic housekeeping, driven by the owner of the store.
    fn periodic_management_task(&self);

    fn start_recording_fetch(&self);

    /// Stop recording and return what was fetched since recording started.
    fn stop_recording_fetch(&self) -> HashSet<String>;

    async fn import_manifest_for_root(
        &self,
        root_id: &RootId,
        manifest: &ObjectId,
    ) -> BackingResult<()>;

    fn parse_root_id(&self, root_id: &str) -> BackingResult<RootId>;

    fn render_root_id(&self, root_id: &RootId) -> String;

    fn parse_object_id(&self, object_id: &str) -> BackingResult<ObjectId>;

    fn render_object_id(&self, object_id: &ObjectId) -> String;

    fn repo_name(&self) -> Option<String>;

    /// Drop queued fetch requests, returning how many were dropped.
    fn drop_all_pending_requests(&self) -> u64;
}
