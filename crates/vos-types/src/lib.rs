//! Foundation types for the virtual object store (VOS).
//!
//! This crate provides the identifiers and object payloads that flow between
//! the persistent cache, the backing source, and the caching orchestrator.
//! Every other VOS crate depends on `vos-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`]: Opaque content-addressed identifier (arbitrary bytes)
//! - [`RootId`]: Identifier of a root/snapshot, resolved by the backing source
//! - [`ContentHash`]: 32-byte secondary digest of a blob's contents
//! - [`Tree`] / [`TreeEntry`]: Directory snapshot keyed by entry name
//! - [`Blob`] / [`BlobMetadata`]: File contents and their lightweight summary
//! - [`FetchOrigin`]: Which tier produced a returned object
//! - [`ObjectComparison`]: Result of comparing two ids without fetching

pub mod blob;
pub mod error;
pub mod hash;
pub mod object;
pub mod origin;
pub mod tree;

pub use blob::{Blob, BlobMetadata};
pub use error::TypeError;
pub use hash::ContentHash;
pub use object::{ObjectId, RootId};
pub use origin::{FetchOrigin, ObjectComparison};
pub use tree::{Tree, TreeEntry, TreeEntryType};
