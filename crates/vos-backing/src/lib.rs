//! Backing source interface for the virtual object store.
//!
//! The backing source is the slow, authoritative provider of trees, blobs,
//! and blob metadata. This crate defines the [`BackingStore`] trait every
//! source implements, the per-request [`FetchContext`] threaded through all
//! layers, and the result types that pair each object with its
//! [`FetchOrigin`](vos_types::FetchOrigin).
//!
//! [`FakeBackingStore`] is an in-memory source with call counting and fault
//! injection, used to test layers stacked on top of a backing store.

pub mod context;
pub mod error;
pub mod fake;
pub mod result;
pub mod traits;

pub use context::{FetchCause, FetchContext};
pub use error::{BackingError, BackingResult};
pub use fake::{FakeBackingStore, FakeFailure, FakeOp};
pub use result::{GetBlobMetadataResult, GetBlobResult, GetTreeResult};
pub use traits::BackingStore;
