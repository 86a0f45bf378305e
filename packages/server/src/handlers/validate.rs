use axum::Json;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{info, instrument, warn};

use crate::error::{AppError, ErrorBody};
use crate::evaluator::{Attachment, EvaluationRequest};
use crate::models::validation::{
    BlockedValidationResponse, RecentValidationsQuery, ValidationRecordResponse,
    ValidationResponse,
};
use crate::state::AppState;
use crate::store::{
    BlobContent, BlobTag, NewValidation, PhotoMeta, ReferenceMeta, ReferenceSource, StoreError,
    normalize_letter,
};
use crate::utils::filename::secure_filename;
use crate::utils::multipart::UploadForm;

use super::files::parse_blob_id;

const DEFAULT_RECENT_LIMIT: u64 = 20;
const MAX_RECENT_LIMIT: u64 = 100;

const BLOCKED_MESSAGE: &str = "A resposta do modelo foi bloqueada ou vazia.";
const UNKNOWN_FINISH_REASON: &str = "DESCONHECIDO";

/// Resolve the reference document: an explicit blob id wins, otherwise the
/// letter index entry for `letter`.
async fn resolve_reference(
    state: &AppState,
    letter: &str,
    pdf_file_id: Option<&str>,
) -> Result<(BlobContent, ReferenceMeta), AppError> {
    if let Some(raw_id) = pdf_file_id {
        let not_found = || AppError::NotFound(format!("PDF '{raw_id}' not found"));
        let blob_id = parse_blob_id(raw_id).ok_or_else(not_found)?;
        let content = match state.store.blobs().get(blob_id).await {
            Ok(content) => content,
            Err(StoreError::NotFound(_)) => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };
        let meta = ReferenceMeta {
            source: ReferenceSource::BlobId,
            blob_id,
            letter: None,
            filename: content.filename.clone(),
            content_type: content.content_type.clone(),
            indexed_at: None,
        };
        return Ok((content, meta));
    }

    let entry = match state.store.letters().lookup(letter).await {
        Ok(entry) => entry,
        Err(StoreError::NotFound(_)) => {
            return Err(AppError::NotFound(format!(
                "No reference PDF for letter '{letter}'. Send 'pdf_file_id' or register one at /api/v1/letters"
            )));
        }
        Err(e) => return Err(e.into()),
    };
    let content = state.store.blobs().get(entry.blob_id).await?;
    let meta = ReferenceMeta {
        source: ReferenceSource::LetterIndex,
        blob_id: entry.blob_id,
        letter: Some(entry.letter),
        filename: entry.filename,
        content_type: content.content_type.clone(),
        indexed_at: Some(entry.created_at),
    };
    Ok((content, meta))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Validation",
    operation_id = "validateLibras",
    summary = "Judge a photo of a hand sign against the reference PDF",
    description = "Multipart fields: `letter` (required), `photo` (image/*, required) and \
        `pdf_file_id` (optional). Without `pdf_file_id` the PDF registered for the letter is \
        used. Every answered request is recorded in the validation log.",
    request_body(content_type = "multipart/form-data", description = "letter + photo [+ pdf_file_id]"),
    responses(
        (status = 200, description = "Model verdict", body = ValidationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "No reference PDF (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 502, description = "Model response blocked or empty", body = BlockedValidationResponse),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn validate_libras(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = UploadForm::read(multipart, state.config.storage.max_blob_size).await?;

    let letter = form
        .text("letter")
        .map(normalize_letter)
        .ok_or_else(|| AppError::Validation("Field 'letter' is required".into()))?;
    let pdf_file_id = form.text("pdf_file_id").map(str::to_string);
    let photo = form
        .take_file("photo")
        .filter(|f| f.is_image())
        .ok_or_else(|| {
            AppError::Validation("Send a valid photo (image/*) in field 'photo'".into())
        })?;
    let photo_content_type = photo.content_type.clone().unwrap_or_default();

    let (reference, reference_meta) =
        resolve_reference(&state, &letter, pdf_file_id.as_deref()).await?;

    let photo_filename = secure_filename(photo.filename.as_deref().unwrap_or_default(), "photo");
    let photo_blob_id = state
        .store
        .blobs()
        .put_if_new(
            &photo.bytes,
            &photo_filename,
            &photo_content_type,
            BlobTag::StudentPhoto,
        )
        .await?;

    let evaluation = state
        .evaluator
        .evaluate(EvaluationRequest {
            letter: &letter,
            photo: Attachment {
                mime_type: &photo_content_type,
                data: &photo.bytes,
            },
            reference: Attachment {
                mime_type: &reference.content_type,
                data: &reference.bytes,
            },
        })
        .await?;

    let validation_id = state
        .store
        .validations()
        .append(NewValidation {
            letter: letter.clone(),
            photo_blob_id,
            reference_blob_id: reference.id,
            model_name: state.evaluator.model_name().to_string(),
            result_text: evaluation.result_text.clone(),
            finish_reason: evaluation.finish_reason.clone(),
            photo_meta: PhotoMeta {
                filename: photo_filename,
                content_type: photo_content_type,
                size_bytes: photo.size(),
            },
            reference_meta,
        })
        .await?;

    let photo_file_id = photo_blob_id.to_string();
    let pdf_file_id = reference.id.to_string();

    match evaluation.result_text {
        Some(resultado) => {
            info!(validation_id, %letter, finish_reason = ?evaluation.finish_reason, "sign evaluated");
            Ok(Json(ValidationResponse {
                resultado,
                finish_reason: evaluation.finish_reason,
                photo_file_id,
                pdf_file_id,
            })
            .into_response())
        }
        None => {
            warn!(validation_id, %letter, finish_reason = ?evaluation.finish_reason, "model returned no text");
            Ok((
                StatusCode::BAD_GATEWAY,
                Json(BlockedValidationResponse {
                    erro: BLOCKED_MESSAGE.into(),
                    finish_reason: evaluation
                        .finish_reason
                        .unwrap_or_else(|| UNKNOWN_FINISH_REASON.into()),
                    photo_file_id,
                    pdf_file_id,
                }),
            )
                .into_response())
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Validation",
    operation_id = "listValidations",
    summary = "Recent validation records",
    description = "Newest first. `limit` defaults to 20 and is clamped to 1-100.",
    params(RecentValidationsQuery),
    responses(
        (status = 200, description = "Validation records", body = Vec<ValidationRecordResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_validations(
    State(state): State<AppState>,
    Query(query): Query<RecentValidationsQuery>,
) -> Result<Json<Vec<ValidationRecordResponse>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, MAX_RECENT_LIMIT);
    let records = state.store.validations().recent(limit).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}
