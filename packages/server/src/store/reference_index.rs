use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::instrument;

use super::StoreError;
use crate::entity::reference_pdf;

/// `reference_key` -> latest blob registered under it. Keys are
/// case-sensitive and stored verbatim.
pub struct ReferenceIndex<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReferenceIndex<'a> {
    pub(super) fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Point `reference_key` at `blob_id`, replacing any previous entry.
    /// The previously referenced blob stays in the blob store.
    #[instrument(skip(self))]
    pub async fn upsert(
        &self,
        reference_key: &str,
        blob_id: i32,
        filename: &str,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let entry = reference_pdf::ActiveModel {
            reference_key: Set(reference_key.to_string()),
            blob_id: Set(blob_id),
            filename: Set(filename.to_string()),
            content_type: Set(content_type.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        reference_pdf::Entity::insert(entry)
            .on_conflict(
                OnConflict::column(reference_pdf::Column::ReferenceKey)
                    .update_columns([
                        reference_pdf::Column::BlobId,
                        reference_pdf::Column::Filename,
                        reference_pdf::Column::ContentType,
                        reference_pdf::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;

        Ok(())
    }

    pub async fn lookup(&self, reference_key: &str) -> Result<reference_pdf::Model, StoreError> {
        reference_pdf::Entity::find()
            .filter(reference_pdf::Column::ReferenceKey.eq(reference_key))
            .one(self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("reference '{reference_key}'")))
    }

    /// All entries, most recently registered first.
    pub async fn list_all(&self) -> Result<Vec<reference_pdf::Model>, StoreError> {
        Ok(reference_pdf::Entity::find()
            .order_by_desc(reference_pdf::Column::CreatedAt)
            .order_by_desc(reference_pdf::Column::Id)
            .all(self.db)
            .await?)
    }
}
