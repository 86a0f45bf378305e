use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::validation;

/// Returned when the model produced a verdict.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationResponse {
    /// Model verdict, starting with "Sim, está correto." or "Não, está incorreto.".
    #[schema(example = "Sim, está correto. A mão forma a letra A.")]
    pub resultado: String,
    #[schema(example = "STOP")]
    pub finish_reason: Option<String>,
    #[schema(example = "2")]
    pub photo_file_id: String,
    #[schema(example = "1")]
    pub pdf_file_id: String,
}

/// Returned with 502 when the model produced no text.
#[derive(Serialize, utoipa::ToSchema)]
pub struct BlockedValidationResponse {
    #[schema(example = "A resposta do modelo foi bloqueada ou vazia.")]
    pub erro: String,
    /// Why generation stopped; `DESCONHECIDO` when the model did not say.
    #[schema(example = "SAFETY")]
    pub finish_reason: String,
    pub photo_file_id: String,
    pub pdf_file_id: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct RecentValidationsQuery {
    /// Maximum number of records (1-100, default 20).
    pub limit: Option<u64>,
}

/// A stored validation record.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationRecordResponse {
    pub id: i32,
    #[schema(example = "A")]
    pub letter: String,
    pub photo_file_id: String,
    pub pdf_file_id: String,
    #[schema(example = "models/gemini-flash-latest")]
    pub model: String,
    pub result_text: Option<String>,
    pub finish_reason: Option<String>,
    pub photo_filename: String,
    pub photo_content_type: String,
    pub photo_size_bytes: i64,
    #[schema(value_type = Object)]
    pub reference_meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<validation::Model> for ValidationRecordResponse {
    fn from(model: validation::Model) -> Self {
        Self {
            id: model.id,
            letter: model.letter,
            photo_file_id: model.photo_blob_id.to_string(),
            pdf_file_id: model.reference_blob_id.to_string(),
            model: model.model_name,
            result_text: model.result_text,
            finish_reason: model.finish_reason,
            photo_filename: model.photo_filename,
            photo_content_type: model.photo_content_type,
            photo_size_bytes: model.photo_size_bytes,
            reference_meta: model.reference_meta,
            created_at: model.created_at,
        }
    }
}
