use std::fmt;

use serde::{Deserialize, Serialize};

/// Which tier produced a returned object.
///
/// Exactly one origin accompanies every successful or empty fetch result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchOrigin {
    /// Nothing was returned; the object legitimately does not exist.
    NotFetched,
    /// Served from an in-process memory cache.
    FromMemoryCache,
    /// Served from a persistent, on-disk cache.
    FromDiskCache,
    /// Fetched from the backing store. `tier` numbers the remote tier that
    /// answered, 0 being the closest.
    FromBackingStore { tier: u8 },
}

impl FetchOrigin {
    /// Origin of an object fetched from the nearest remote tier.
    pub const REMOTE: Self = Self::FromBackingStore { tier: 0 };

    pub fn is_backing_store(&self) -> bool {
        matches!(self, Self::FromBackingStore { .. })
    }
}

impl fmt::Display for FetchOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFetched => write!(f, "not-fetched"),
            Self::FromMemoryCache => write!(f, "memory-cache"),
            Self::FromDiskCache => write!(f, "disk-cache"),
            Self::FromBackingStore { tier } => write!(f, "backing-store/{tier}"),
        }
    }
}

/// Outcome of comparing two object ids without fetching either object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectComparison {
    /// The id scheme cannot tell whether the contents match.
    Unknown,
    /// Both ids name identical contents.
    Identical,
    /// The ids name different contents.
    Different,
}
