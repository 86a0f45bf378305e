use async_trait::async_trait;

use super::error::StorageError;
use super::hash::ContentHash;

/// Content-addressed storage for raw blob bytes.
///
/// Bytes are immutable once written and keyed by their own hash, so writing
/// the same content twice is a no-op. Metadata (filenames, MIME types, ids)
/// lives elsewhere.
#[async_trait]
pub trait ByteStore: Send + Sync {
    /// Store `data` and return its content hash.
    async fn put(&self, data: &[u8]) -> Result<ContentHash, StorageError>;

    /// Read back every byte stored under `hash`.
    async fn get(&self, hash: &ContentHash) -> Result<Vec<u8>, StorageError>;
}
