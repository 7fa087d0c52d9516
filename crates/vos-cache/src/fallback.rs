//! Ordered fallback tiers for blob metadata.
//!
//! When the local store cannot answer a metadata request, the tiers in
//! [`METADATA_FALLBACK`] are consulted in order. Each tier either produces a
//! definitive answer or defers to the next one; if every tier defers the
//! metadata is reported as not fetched.

use vos_types::{BlobMetadata, FetchOrigin};

/// A source of blob metadata behind the local store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataTier {
    /// The backing store's own metadata fetch.
    BackingStore,
    /// Fetch the blob and hash it.
    DeriveFromBlob,
}

pub const METADATA_FALLBACK: [MetadataTier; 2] =
    [MetadataTier::BackingStore, MetadataTier::DeriveFromBlob];

/// What one tier produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TierOutcome {
    Found(BlobMetadata, FetchOrigin),
    Next,
}
