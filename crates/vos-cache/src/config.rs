use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CacheResult;
use crate::policy::{CachingPolicy, ObjectKind};

/// When write-through results are flushed to the local store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteThroughMode {
    /// Flush before the fetch returns. The written objects are visible to the
    /// next request as soon as the call completes, at the cost of delaying
    /// the result by the flush. A failed flush is still never returned.
    #[default]
    Inline,
    /// Flush on a spawned task; the fetch returns without waiting for it.
    Background,
}

/// Configuration for a [`CachedBackingStore`](crate::CachedBackingStore).
///
/// ```toml
/// cache = ["trees", "blob-metadata"]
/// write_through = "inline"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Object kinds persisted in the local store.
    pub cache: Vec<ObjectKind>,
    pub write_through: WriteThroughMode,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache: ObjectKind::ALL.to_vec(),
            write_through: WriteThroughMode::Inline,
        }
    }
}

impl CacheConfig {
    pub fn from_toml_str(s: &str) -> CacheResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> CacheResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The caching policy described by `cache`; fails with
    /// [`CacheError::EmptyPolicy`](crate::CacheError::EmptyPolicy) if the list
    /// is empty. Unknown kind names never get this far: parsing rejects them
    /// as [`CacheError::Config`](crate::CacheError::Config).
    pub fn policy(&self) -> CacheResult<CachingPolicy> {
        CachingPolicy::from_kinds(self.cache.iter().copied())
    }
}
