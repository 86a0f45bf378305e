use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One evaluation request. Rows are only ever inserted.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "validation")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub letter: String,

    pub photo_blob_id: i32,
    pub reference_blob_id: i32,

    pub model_name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub result_text: Option<String>,

    pub finish_reason: Option<String>,

    pub photo_filename: String,
    pub photo_content_type: String,
    pub photo_size_bytes: i64,

    /// Snapshot of the reference the evaluation was run against.
    #[sea_orm(column_type = "Json")]
    pub reference_meta: serde_json::Value,

    #[sea_orm(indexed)]
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
