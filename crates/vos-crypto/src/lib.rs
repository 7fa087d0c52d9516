//! Content hashing for the virtual object store.
//!
//! Provides the domain-separated BLAKE3 hasher used wherever blob metadata is
//! computed. Every component that derives a [`BlobMetadata`] from blob bytes
//! goes through [`ContentHasher::BLOB`], so derived and reported metadata
//! agree for the same contents.
//!
//! [`BlobMetadata`]: vos_types::BlobMetadata

pub mod hasher;

pub use hasher::ContentHasher;
