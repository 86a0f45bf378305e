use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::instrument;

use super::StoreError;
use crate::entity::letter_pdf;

/// Canonical form of a letter key: surrounding whitespace removed, uppercased.
///
/// Every read and write of the letter index goes through this, so `" a"`,
/// `"a"` and `"A"` always address the same entry.
pub fn normalize_letter(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Letter -> latest reference PDF for that letter. One entry per letter,
/// enforced by a unique index.
pub struct LetterIndex<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LetterIndex<'a> {
    pub(super) fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn upsert(
        &self,
        letter: &str,
        blob_id: i32,
        filename: &str,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let entry = letter_pdf::ActiveModel {
            letter: Set(normalize_letter(letter)),
            blob_id: Set(blob_id),
            filename: Set(filename.to_string()),
            content_type: Set(content_type.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        letter_pdf::Entity::insert(entry)
            .on_conflict(
                OnConflict::column(letter_pdf::Column::Letter)
                    .update_columns([
                        letter_pdf::Column::BlobId,
                        letter_pdf::Column::Filename,
                        letter_pdf::Column::ContentType,
                        letter_pdf::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;

        Ok(())
    }

    pub async fn lookup(&self, letter: &str) -> Result<letter_pdf::Model, StoreError> {
        let letter = normalize_letter(letter);
        letter_pdf::Entity::find()
            .filter(letter_pdf::Column::Letter.eq(&letter))
            .one(self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("letter '{letter}'")))
    }

    /// All entries in alphabetical order.
    pub async fn list_all(&self) -> Result<Vec<letter_pdf::Model>, StoreError> {
        Ok(letter_pdf::Entity::find()
            .order_by_asc(letter_pdf::Column::Letter)
            .all(self.db)
            .await?)
    }
}
