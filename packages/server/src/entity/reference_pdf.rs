use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reference_pdf")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Free-form key, stored exactly as given.
    #[sea_orm(unique)]
    pub reference_key: String,

    /// Not a foreign key: blobs may disappear without touching the index.
    pub blob_id: i32,

    pub filename: String,
    pub content_type: String,

    #[sea_orm(indexed)]
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
