//! Local-store caching layer for the virtual object store.
//!
//! [`CachedBackingStore`] sits in front of a slow, authoritative
//! [`BackingStore`](vos_backing::BackingStore) and persists what it fetches
//! into a [`LocalStore`](vos_store::LocalStore), so later requests for the
//! same id are answered from disk. It implements the backing store trait
//! itself and can replace the store it wraps.
//!
//! # Request protocol
//!
//! 1. If the [`CachingPolicy`] covers the object kind, consult the local store.
//!    A hit is returned tagged `FromDiskCache`.
//! 2. On a miss (or when the kind is not cached), delegate to the backing store.
//! 3. After a successful fetch, write the result (and anything derivable from
//!    it, such as blob metadata carried inline by tree entries) back into the
//!    local store, as far as the policy allows.
//!
//! Blob metadata falls back through an ordered list of tiers (see
//! [`fallback`]): the backing store's own metadata, then hashing the blob.
//!
//! # Failure model
//!
//! Only backing store errors reach callers. Local store read faults are soft
//! misses; write faults are counted in [`CacheStats`] and logged, never
//! returned.

pub mod cached;
pub mod config;
pub mod error;
pub mod fallback;
pub mod policy;
pub mod stats;
pub mod writer;

pub use cached::CachedBackingStore;
pub use config::{CacheConfig, WriteThroughMode};
pub use error::{CacheError, CacheResult};
pub use fallback::{MetadataTier, METADATA_FALLBACK};
pub use policy::{CachingPolicy, ObjectKind};
pub use stats::{CacheStats, Counter};
