use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::{letter_pdf, reference_pdf};

/// Response DTO after registering a PDF under a key.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PdfUploadResponse {
    #[schema(example = "PDF cadastrado/atualizado")]
    pub message: String,
    /// Blob id the key now points at.
    #[schema(example = "1")]
    pub file_id: String,
    #[schema(example = "alfabeto_v1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_key: Option<String>,
    #[schema(example = "A")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter: Option<String>,
}

/// One entry of the reference index.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ReferencePdfResponse {
    #[schema(example = "alfabeto_v1")]
    pub reference_key: String,
    #[schema(example = "1")]
    pub file_id: String,
    #[schema(example = "alfabeto.pdf")]
    pub filename: String,
    #[schema(example = "application/pdf")]
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<reference_pdf::Model> for ReferencePdfResponse {
    fn from(model: reference_pdf::Model) -> Self {
        Self {
            reference_key: model.reference_key,
            file_id: model.blob_id.to_string(),
            filename: model.filename,
            content_type: model.content_type,
            created_at: model.created_at,
        }
    }
}

/// One entry of the letter index.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LetterPdfResponse {
    #[schema(example = "A")]
    pub letter: String,
    #[schema(example = "1")]
    pub file_id: String,
    #[schema(example = "letra_a.pdf")]
    pub filename: String,
    #[schema(example = "application/pdf")]
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<letter_pdf::Model> for LetterPdfResponse {
    fn from(model: letter_pdf::Model) -> Self {
        Self {
            letter: model.letter,
            file_id: model.blob_id.to_string(),
            filename: model.filename,
            content_type: model.content_type,
            created_at: model.created_at,
        }
    }
}
