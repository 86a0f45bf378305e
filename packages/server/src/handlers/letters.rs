use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::models::pdf::{LetterPdfResponse, PdfUploadResponse};
use crate::state::AppState;
use crate::store::{BlobTag, normalize_letter};
use crate::utils::filename::secure_filename;
use crate::utils::multipart::UploadForm;

use super::files::blob_response;

/// Normalize `raw` and require a single letter A-Z.
pub fn parse_letter(raw: &str) -> Result<String, AppError> {
    let letter = normalize_letter(raw);
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => Ok(letter),
        _ => Err(AppError::Validation(format!(
            "Letter must be a single character A-Z, got '{}'",
            raw.trim()
        ))),
    }
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Letter PDFs",
    operation_id = "uploadLetterPdf",
    summary = "Register the reference PDF for a letter",
    description = "Multipart fields: `letter` (A-Z, case-insensitive) and `file` \
        (application/pdf). A letter holds exactly one PDF; uploading again replaces it.",
    request_body(content_type = "multipart/form-data", description = "letter + PDF file"),
    responses(
        (status = 200, description = "PDF registered", body = PdfUploadResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_letter_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PdfUploadResponse>, AppError> {
    let mut form = UploadForm::read(multipart, state.config.storage.max_blob_size).await?;

    let letter = parse_letter(
        form.text("letter")
            .ok_or_else(|| AppError::Validation("Field 'letter' is required".into()))?,
    )?;
    let file = form
        .take_file("file")
        .filter(|f| f.is_pdf())
        .ok_or_else(|| AppError::Validation("Field 'file' must be a PDF".into()))?;

    let filename = secure_filename(file.filename.as_deref().unwrap_or_default(), "reference.pdf");
    let content_type = "application/pdf";

    let blob_id = state
        .store
        .blobs()
        .put_if_new(&file.bytes, &filename, content_type, BlobTag::LetterPdf)
        .await?;
    state
        .store
        .letters()
        .upsert(&letter, blob_id, &filename, content_type)
        .await?;

    info!(%letter, blob_id, "letter PDF registered");

    Ok(Json(PdfUploadResponse {
        message: "PDF cadastrado/atualizado".into(),
        file_id: blob_id.to_string(),
        reference_key: None,
        letter: Some(letter),
    }))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Letter PDFs",
    operation_id = "listLetterPdfs",
    summary = "List letter PDFs",
    description = "Returns every registered letter in alphabetical order.",
    responses(
        (status = 200, description = "Letter list", body = Vec<LetterPdfResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_letter_pdfs(
    State(state): State<AppState>,
) -> Result<Json<Vec<LetterPdfResponse>>, AppError> {
    let entries = state.store.letters().list_all().await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{letter}/download",
    tag = "Letter PDFs",
    operation_id = "downloadLetterPdf",
    summary = "Download the PDF registered for a letter",
    params(("letter" = String, Path, description = "Letter (case-insensitive)")),
    responses(
        (status = 200, description = "PDF content", content_type = "application/pdf"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 404, description = "Letter or blob not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn download_letter_pdf(
    State(state): State<AppState>,
    Path(letter): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let entry = state.store.letters().lookup(&letter).await?;
    let content = state.store.blobs().get(entry.blob_id).await?;
    blob_response(content, &headers)
}
