//! Persistent local cache for the virtual object store.
//!
//! The local store is a durable key/value space partitioned into
//! [`KeySpace`]s, one per cacheable object kind. It never decides *what* to
//! cache; that is the caching orchestrator's job. It only has to be safe
//! for concurrent use from many in-flight requests.
//!
//! # Storage Backends
//!
//! All backends implement the [`LocalStore`] trait:
//!
//! - [`MemoryLocalStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileLocalStore`] -- one file per key under a directory per key space
//!
//! # Design Rules
//!
//! 1. Values for a key are immutable content: rewriting a key with the same
//!    value is always safe, and concurrent writers of one key never merge.
//! 2. A [`WriteBatch`] is owned by a single writer and becomes visible only
//!    when flushed through [`LocalStore::flush`].
//! 3. Decoding failures surface as [`StoreError::Corrupt`], never as panics.

pub mod batch;
pub mod codec;
pub mod error;
pub mod file;
pub mod keyspace;
pub mod memory;
pub mod traits;

pub use batch::{PendingWrite, WriteBatch};
pub use error::{StoreError, StoreResult};
pub use file::FileLocalStore;
pub use keyspace::KeySpace;
pub use memory::MemoryLocalStore;
pub use traits::LocalStore;
