use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content-addressed identifier for any object served by the store.
///
/// An `ObjectId` is an opaque byte sequence. The caching layer never inspects
/// it beyond byte equality: it is a cache key, nothing more. How ids are
/// derived and rendered is decided by the backing source. Cloning is cheap
/// (the bytes are reference counted).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(Bytes);

impl ObjectId {
    /// Wrap raw identifier bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Copy identifier bytes out of a slice.
    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }

    /// The raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes in the identifier.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the identifier has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Short hex representation (first 4 bytes).
    pub fn short_hex(&self) -> String {
        let end = self.0.len().min(4);
        hex::encode(&self.0[..end])
    }

    /// Parse from a hex string. The empty string is rejected.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() {
            return Err(TypeError::Empty);
        }
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Ok(Self(Bytes::from(bytes)))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<Vec<u8>> for ObjectId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for ObjectId {
    fn from(bytes: &'static [u8]) -> Self {
        Self(Bytes::from_static(bytes))
    }
}

/// Identifier of a root (for example a commit) whose tree the backing
/// source knows how to resolve.
///
/// Root ids are not content-addressed from the cache's point of view: the
/// tree a root resolves to is always asked of the backing source.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RootId(String);

impl RootId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RootId({})", self.0)
    }
}

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn equality_is_byte_equality() {
        let a = ObjectId::copy_from_slice(b"abc");
        let b = ObjectId::from(b"abc".to_vec());
        let c = ObjectId::copy_from_slice(b"abd");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ids_may_have_any_length() {
        let short = ObjectId::copy_from_slice(&[1]);
        let long = ObjectId::copy_from_slice(&[7u8; 40]);
        assert_eq!(short.len(), 1);
        assert_eq!(long.len(), 40);
        assert_eq!(short.short_hex(), "01");
        assert_eq!(long.short_hex().len(), 8);
    }

    #[test]
    fn empty_hex_is_rejected() {
        assert_eq!(ObjectId::from_hex(""), Err(TypeError::Empty));
    }

    #[test]
    fn bad_hex_is_rejected() {
        assert!(matches!(
            ObjectId::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn display_is_full_hex() {
        let id = ObjectId::copy_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x01]);
        assert_eq!(format!("{id}"), "deadbeef01");
        assert_eq!(format!("{id:?}"), "ObjectId(deadbeef)");
    }

    #[test]
    fn serde_roundtrip() {
        let id = ObjectId::copy_from_slice(b"serde test");
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn root_id_display() {
        let root = RootId::new("1b7f0c");
        assert_eq!(root.as_str(), "1b7f0c");
        assert_eq!(format!("{root}"), "1b7f0c");
    }

    proptest! {
        #[test]
        fn hex_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 1..64)) {
            let id = ObjectId::from(bytes);
            let parsed = ObjectId::from_hex(&id.to_hex()).unwrap();
            prop_assert_eq!(id, parsed);
        }
    }
}
