use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Metadata row for one stored blob. The bytes live in the byte store under
/// `content_hash`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blob")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// SHA-256 of the bytes. At most one row per hash.
    #[sea_orm(unique)]
    pub content_hash: String,

    pub filename: String,
    pub content_type: String,

    /// Purpose classifier: `reference_pdf`, `letter_pdf` or `student_photo`.
    pub tag: String,

    pub size: i64,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
