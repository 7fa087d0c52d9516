use std::io;

/// Errors raised while configuring a caching layer.
///
/// Fetch failures are never wrapped here: they come from the backing store
/// and are returned as [`BackingError`](vos_backing::BackingError) unchanged.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A policy must cache at least one object kind.
    #[error("caching policy must include at least one object kind")]
    EmptyPolicy,

    #[error("invalid caching policy bits {0:#05b}")]
    InvalidPolicyBits(u8),

    #[error("unknown object kind: {0}")]
    UnknownObjectKind(String),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the cache crate.
pub type CacheResult<T> = std::result::Result<T, CacheError>;
