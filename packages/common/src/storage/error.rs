use thiserror::Error;

/// Errors raised by a [`ByteStore`](super::ByteStore).
#[derive(Debug, Error)]
pub enum StorageError {
    /// No bytes are stored under the given hash.
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A hex string could not be parsed as a content hash.
    #[error("invalid content hash: {0}")]
    InvalidHash(String),

    #[error("blob exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
