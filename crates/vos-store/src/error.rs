use crate::keyspace::KeySpace;

/// Errors from local store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure while encoding a value.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored value could not be decoded.
    #[error("corrupt value in {key_space} key space: {reason}")]
    Corrupt { key_space: KeySpace, reason: String },

    /// The store cannot serve requests right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
