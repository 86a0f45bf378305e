use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::StoreError;
use crate::entity::validation;

/// Where the reference document of an evaluation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSource {
    /// Resolved through the letter index.
    LetterIndex,
    /// Named explicitly by blob id in the request.
    BlobId,
}

/// Snapshot of the reference used, kept with the record so later index
/// changes do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceMeta {
    pub source: ReferenceSource,
    pub blob_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter: Option<String>,
    pub filename: String,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoMeta {
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
}

/// Everything recorded about one evaluation request.
#[derive(Debug, Clone)]
pub struct NewValidation {
    pub letter: String,
    pub photo_blob_id: i32,
    pub reference_blob_id: i32,
    pub model_name: String,
    /// `None` together with `finish_reason` describes a blocked or empty
    /// model response; that is still a valid record.
    pub result_text: Option<String>,
    pub finish_reason: Option<String>,
    pub photo_meta: PhotoMeta,
    pub reference_meta: ReferenceMeta,
}

pub struct ValidationLog<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ValidationLog<'a> {
    pub(super) fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a new record and return its id. Not idempotent: identical
    /// records produce distinct rows.
    #[instrument(skip(self, record), fields(letter = %record.letter))]
    pub async fn append(&self, record: NewValidation) -> Result<i32, StoreError> {
        let reference_meta = serde_json::to_value(&record.reference_meta)
            .map_err(|e| StoreError::Unavailable(format!("reference_meta: {e}")))?;

        let row = validation::ActiveModel {
            letter: Set(record.letter),
            photo_blob_id: Set(record.photo_blob_id),
            reference_blob_id: Set(record.reference_blob_id),
            model_name: Set(record.model_name),
            result_text: Set(record.result_text),
            finish_reason: Set(record.finish_reason),
            photo_filename: Set(record.photo_meta.filename),
            photo_content_type: Set(record.photo_meta.content_type),
            photo_size_bytes: Set(record.photo_meta.size_bytes),
            reference_meta: Set(reference_meta),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let saved = row.insert(self.db).await?;
        Ok(saved.id)
    }

    pub async fn get(&self, id: i32) -> Result<validation::Model, StoreError> {
        validation::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("validation {id}")))
    }

    /// Latest `limit` records, newest first.
    pub async fn recent(&self, limit: u64) -> Result<Vec<validation::Model>, StoreError> {
        Ok(validation::Entity::find()
            .order_by_desc(validation::Column::CreatedAt)
            .order_by_desc(validation::Column::Id)
            .limit(limit)
            .all(self.db)
            .await?)
    }
}
