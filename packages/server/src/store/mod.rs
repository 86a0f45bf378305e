//! Persistence core: deduplicated blobs, the two key-to-blob indexes and the
//! validation log.
//!
//! All concurrency guarantees come from unique constraints in the database.
//! Writes are single statements (`INSERT ... ON CONFLICT`), never a lookup
//! followed by an insert.

mod blobs;
mod letter_index;
mod reference_index;
mod validation_log;

use std::sync::Arc;

use common::storage::{ByteStore, StorageError};
use sea_orm::{DatabaseConnection, DbErr};
use thiserror::Error;

pub use blobs::{BlobContent, BlobTag, Blobs};
pub use letter_index::{LetterIndex, normalize_letter};
pub use reference_index::ReferenceIndex;
pub use validation_log::{NewValidation, PhotoMeta, ReferenceMeta, ReferenceSource, ValidationLog};

#[derive(Debug, Error)]
pub enum StoreError {
    /// An id or key does not resolve.
    #[error("{0} not found")]
    NotFound(String),

    /// A concurrent writer won a unique-constraint race. Handled internally by
    /// re-reading the winner; callers outside this module never see it.
    #[error("lost insert race on {0}")]
    DuplicateKeyRace(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("blob of {actual} bytes exceeds the {limit} byte limit")]
    TooLarge { actual: u64, limit: u64 },
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(hash) => StoreError::NotFound(format!("blob bytes {hash}")),
            StorageError::SizeLimitExceeded { actual, limit } => {
                StoreError::TooLarge { actual, limit }
            }
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Handle to everything the service persists.
///
/// Built once at startup and cloned into each request; clones share the same
/// connection pool and byte store.
#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
    bytes: Arc<dyn ByteStore>,
}

impl Store {
    pub fn new(db: DatabaseConnection, bytes: Arc<dyn ByteStore>) -> Self {
        Self { db, bytes }
    }

    pub fn blobs(&self) -> Blobs<'_> {
        Blobs::new(&self.db, &*self.bytes)
    }

    pub fn references(&self) -> ReferenceIndex<'_> {
        ReferenceIndex::new(&self.db)
    }

    pub fn letters(&self) -> LetterIndex<'_> {
        LetterIndex::new(&self.db)
    }

    pub fn validations(&self) -> ValidationLog<'_> {
        ValidationLog::new(&self.db)
    }

    /// Cheap connectivity probe for health checks.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await.map_err(StoreError::from)
    }

    /// Close the connection pool. Only called once, at shutdown.
    pub async fn close(self) -> Result<(), StoreError> {
        self.db.close().await.map_err(StoreError::from)
    }
}
