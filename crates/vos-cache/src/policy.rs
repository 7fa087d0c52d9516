use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vos_store::KeySpace;

use crate::error::{CacheError, CacheResult};

/// Object kinds a caching layer can persist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    Trees,
    Blobs,
    BlobMetadata,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 3] = [ObjectKind::Trees, ObjectKind::Blobs, ObjectKind::BlobMetadata];

    fn bit(self) -> u8 {
        match self {
            Self::Trees => 0b001,
            Self::Blobs => 0b010,
            Self::BlobMetadata => 0b100,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Trees => "trees",
            Self::Blobs => "blobs",
            Self::BlobMetadata => "blob-metadata",
        }
    }

    /// Local store key space holding this kind.
    pub fn key_space(self) -> KeySpace {
        match self {
            Self::Trees => KeySpace::Tree,
            Self::Blobs => KeySpace::Blob,
            Self::BlobMetadata => KeySpace::BlobMetadata,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectKind {
    type Err = CacheError;

    fn from_str(s: &str) -> CacheResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| CacheError::UnknownObjectKind(s.to_string()))
    }
}

/// Set of object kinds to persist in the local store.
///
/// Kinds are independent flags and any non-empty combination is valid. An
/// empty policy cannot be built: a caching layer that caches nothing should
/// not exist.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CachingPolicy(u8);

impl CachingPolicy {
    pub const TREES: Self = Self(0b001);
    pub const BLOBS: Self = Self(0b010);
    pub const BLOB_METADATA: Self = Self(0b100);
    pub const TREES_AND_BLOB_METADATA: Self = Self(0b101);
    pub const ANYTHING: Self = Self(0b111);

    /// Build a policy from a list of kinds.
    pub fn from_kinds(kinds: impl IntoIterator<Item = ObjectKind>) -> CacheResult<Self> {
        let bits = kinds.into_iter().fold(0, |bits, kind| bits | kind.bit());
        Self::from_bits(bits)
    }

    /// Build a policy from its raw bit representation.
    pub fn from_bits(bits: u8) -> CacheResult<Self> {
        if bits == 0 {
            return Err(CacheError::EmptyPolicy);
        }
        if bits & !Self::ANYTHING.0 != 0 {
            return Err(CacheError::InvalidPolicyBits(bits));
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether `kind` is cached under this policy.
    pub fn should_cache(self, kind: ObjectKind) -> bool {
        self.0 & kind.bit() == kind.bit()
    }

    /// Whether every kind in `other` is also in `self`.
    pub fn contains(self, other: CachingPolicy) -> bool {
        self.0 & other.0 == other.0
    }

    /// Kinds covered by this policy.
    pub fn kinds(self) -> impl Iterator<Item = ObjectKind> {
        ObjectKind::ALL
            .into_iter()
            .filter(move |kind| self.should_cache(*kind))
    }
}

impl BitOr for CachingPolicy {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for CachingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.kinds().map(ObjectKind::name).collect();
        write!(f, "CachingPolicy({})", names.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_policy_is_rejected() {
        assert!(matches!(CachingPolicy::from_bits(0), Err(CacheError::EmptyPolicy)));
        assert!(matches!(
            CachingPolicy::from_kinds(Vec::new()),
            Err(CacheError::EmptyPolicy)
        ));
    }

    #[test]
    fn unknown_bits_are_rejected() {
        assert!(matches!(
            CachingPolicy::from_bits(0b1000),
            Err(CacheError::InvalidPolicyBits(8))
        ));
    }

    #[test]
    fn named_combinations() {
        assert_eq!(
            CachingPolicy::TREES | CachingPolicy::BLOB_METADATA,
            CachingPolicy::TREES_AND_BLOB_METADATA
        );
        assert_eq!(
            CachingPolicy::TREES | CachingPolicy::BLOBS | CachingPolicy::BLOB_METADATA,
            CachingPolicy::ANYTHING
        );
        assert!(CachingPolicy::ANYTHING.contains(CachingPolicy::BLOBS));
        assert!(!CachingPolicy::TREES.contains(CachingPolicy::TREES_AND_BLOB_METADATA));
    }

    #[test]
    fn debug_lists_kinds() {
        assert_eq!(
            format!("{:?}", CachingPolicy::TREES_AND_BLOB_METADATA),
            "CachingPolicy(trees | blob-metadata)"
        );
    }

    #[test]
    fn kind_names_parse() {
        for kind in ObjectKind::ALL {
            assert_eq!(kind.name().parse::<ObjectKind>().unwrap(), kind);
        }
        assert!(matches!(
            "manifests".parse::<ObjectKind>(),
            Err(CacheError::UnknownObjectKind(_))
        ));
    }

    proptest! {
        #[test]
        fn should_cache_is_containment(mask in 1u8..8) {
            let kinds: Vec<ObjectKind> = ObjectKind::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, kind)| kind)
                .collect();
            let policy = CachingPolicy::from_kinds(kinds.clone()).unwrap();
            for kind in ObjectKind::ALL {
                prop_assert_eq!(policy.should_cache(kind), kinds.contains(&kind));
            }
            prop_assert_eq!(policy.kinds().collect::<Vec<_>>(), kinds);
        }
    }
}
