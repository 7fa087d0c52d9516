use vos_types::{Blob, BlobMetadata, ContentHash};

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"vos-blob-v1"`) that is prepended
/// to every hash computation, so digests from different domains never collide
/// for identical bytes.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for blob contents.
    pub const BLOB: Self = Self {
        domain: "vos-blob-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ContentHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ContentHash::from_bytes(*hasher.finalize().as_bytes())
    }

    /// Hash and measure a blob.
    pub fn blob_metadata(&self, blob: &Blob) -> BlobMetadata {
        BlobMetadata::new(self.hash(blob.contents()), blob.size())
    }
}
