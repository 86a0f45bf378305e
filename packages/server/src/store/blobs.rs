use std::fmt;

use chrono::Utc;
use common::storage::{ByteStore, ContentHash};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use tracing::{debug, instrument, warn};

use super::StoreError;
use crate::entity::blob;

/// What an uploaded blob is for. Stored alongside the blob; storage logic
/// does not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobTag {
    ReferencePdf,
    LetterPdf,
    StudentPhoto,
}

impl BlobTag {
    pub fn as_str(self) -> &'static str {
        match self {
            BlobTag::ReferencePdf => "reference_pdf",
            BlobTag::LetterPdf => "letter_pdf",
            BlobTag::StudentPhoto => "student_photo",
        }
    }
}

impl fmt::Display for BlobTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bytes of a stored blob together with the metadata recorded at first upload.
#[derive(Debug, Clone)]
pub struct BlobContent {
    pub id: i32,
    pub content_hash: ContentHash,
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub filename: String,
}

/// Content-addressed blob store: metadata rows in the `blob` table, bytes in a
/// [`ByteStore`].
pub struct Blobs<'a> {
    db: &'a DatabaseConnection,
    bytes: &'a dyn ByteStore,
}

impl<'a> Blobs<'a> {
    pub(super) fn new(db: &'a DatabaseConnection, bytes: &'a dyn ByteStore) -> Self {
        Self { db, bytes }
    }

    /// Store `data` unless identical bytes are already present, returning the
    /// id of the single blob holding them.
    ///
    /// When the content already exists the given `filename`, `content_type`
    /// and `tag` are discarded in favour of the values stored first.
    #[instrument(skip(self, data, tag), fields(size = data.len(), tag = %tag))]
    pub async fn put_if_new(
        &self,
        data: &[u8],
        filename: &str,
        content_type: &str,
        tag: BlobTag,
    ) -> Result<i32, StoreError> {
        let hash = ContentHash::of(data);

        if let Some(existing) = self.find_by_hash(&hash).await? {
            debug!(blob_id = existing.id, %hash, "deduplicated upload");
            return Ok(existing.id);
        }

        // Bytes first: a row must never point at content that is not on disk.
        self.bytes.put(data).await?;

        match self
            .insert_row(&hash, data.len(), filename, content_type, tag)
            .await
        {
            Ok(id) => Ok(id),
            Err(StoreError::DuplicateKeyRace(key)) => {
                warn!(%key, "concurrent upload of identical content, using the stored blob");
                self.find_by_hash(&hash)
                    .await?
                    .map(|row| row.id)
                    .ok_or_else(|| {
                        StoreError::Unavailable(format!("blob {hash} vanished after insert race"))
                    })
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch a blob's bytes, MIME type and original filename.
    #[instrument(skip(self))]
    pub async fn get(&self, blob_id: i32) -> Result<BlobContent, StoreError> {
        let row = self.metadata(blob_id).await?;
        let hash = ContentHash::from_hex(&row.content_hash)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let bytes = self.bytes.get(&hash).await?;

        Ok(BlobContent {
            id: row.id,
            content_hash: hash,
            bytes,
            content_type: row.content_type,
            filename: row.filename,
        })
    }

    /// Metadata row only, without touching the byte store.
    pub async fn metadata(&self, blob_id: i32) -> Result<blob::Model, StoreError> {
        blob::Entity::find_by_id(blob_id)
            .one(self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("blob {blob_id}")))
    }

    async fn find_by_hash(&self, hash: &ContentHash) -> Result<Option<blob::Model>, StoreError> {
        Ok(blob::Entity::find()
            .filter(blob::Column::ContentHash.eq(hash.to_hex()))
            .one(self.db)
            .await?)
    }

    /// Insert the metadata row. The unique index on `content_hash` decides
    /// the winner when two requests upload the same bytes at once; the loser
    /// gets [`StoreError::DuplicateKeyRace`].
    async fn insert_row(
        &self,
        hash: &ContentHash,
        size: usize,
        filename: &str,
        content_type: &str,
        tag: BlobTag,
    ) -> Result<i32, StoreError> {
        let row = blob::ActiveModel {
            content_hash: Set(hash.to_hex()),
            filename: Set(filename.to_string()),
            content_type: Set(content_type.to_string()),
            tag: Set(tag.as_str().to_string()),
            size: Set(i64::try_from(size).unwrap_or(i64::MAX)),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let inserted = match blob::Entity::insert(row)
            .on_conflict(
                OnConflict::column(blob::Column::ContentHash)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db)
            .await
        {
            Ok(rows) => rows > 0,
            Err(DbErr::RecordNotInserted) => false,
            Err(e) => return Err(e.into()),
        };

        if !inserted {
            return Err(StoreError::DuplicateKeyRace(hash.to_hex()));
        }

        let saved = self.find_by_hash(hash).await?.ok_or_else(|| {
            StoreError::Unavailable(format!("blob {hash} missing after insert"))
        })?;
        debug!(blob_id = saved.id, %hash, "stored new blob");
        Ok(saved.id)
    }
}
