use thiserror::Error;
use vos_types::{ObjectId, RootId};

/// Errors reported by a backing source.
#[derive(Debug, Error)]
pub enum BackingError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: ObjectId },

    #[error("root {0} not found")]
    RootNotFound(RootId),

    #[error("transport error: {0}")]
    Transport(String),

    /// The fetch was cancelled before it produced a result.
    #[error("fetch cancelled")]
    Cancelled,

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

pub type BackingResult<T> = Result<T, BackingError>;
