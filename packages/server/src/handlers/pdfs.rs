use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::models::pdf::{PdfUploadResponse, ReferencePdfResponse};
use crate::state::AppState;
use crate::store::BlobTag;
use crate::utils::filename::secure_filename;
use crate::utils::multipart::UploadForm;

use super::files::blob_response;

#[utoipa::path(
    post,
    path = "/",
    tag = "Reference PDFs",
    operation_id = "uploadReferencePdf",
    summary = "Register a reference PDF under a key",
    description = "Multipart fields: `reference_key` (text) and `file` (application/pdf). \
        Re-uploading to an existing key replaces the entry; identical PDF bytes are stored once.",
    request_body(content_type = "multipart/form-data", description = "reference_key + PDF file"),
    responses(
        (status = 200, description = "PDF registered", body = PdfUploadResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PdfUploadResponse>, AppError> {
    let mut form = UploadForm::read(multipart, state.config.storage.max_blob_size).await?;

    let reference_key = form
        .text("reference_key")
        .ok_or_else(|| AppError::Validation("Field 'reference_key' is required".into()))?
        .to_string();
    let file = form
        .take_file("file")
        .filter(|f| f.is_pdf())
        .ok_or_else(|| AppError::Validation("Field 'file' must be a PDF".into()))?;

    let filename = secure_filename(file.filename.as_deref().unwrap_or_default(), "reference.pdf");
    let content_type = "application/pdf";

    let blob_id = state
        .store
        .blobs()
        .put_if_new(&file.bytes, &filename, content_type, BlobTag::ReferencePdf)
        .await?;
    state
        .store
        .references()
        .upsert(&reference_key, blob_id, &filename, content_type)
        .await?;

    info!(%reference_key, blob_id, "reference PDF registered");

    Ok(Json(PdfUploadResponse {
        message: "PDF cadastrado/atualizado".into(),
        file_id: blob_id.to_string(),
        reference_key: Some(reference_key),
        letter: None,
    }))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Reference PDFs",
    operation_id = "listReferencePdfs",
    summary = "List reference PDFs",
    description = "Returns every reference key, most recently registered first.",
    responses(
        (status = 200, description = "Reference list", body = Vec<ReferencePdfResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_pdfs(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReferencePdfResponse>>, AppError> {
    let entries = state.store.references().list_all().await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{reference_key}/download",
    tag = "Reference PDFs",
    operation_id = "downloadReferencePdf",
    summary = "Download the PDF registered under a key",
    params(("reference_key" = String, Path, description = "Reference key (case-sensitive)")),
    responses(
        (status = 200, description = "PDF content", content_type = "application/pdf"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 404, description = "Key or blob not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn download_pdf(
    State(state): State<AppState>,
    Path(reference_key): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let entry = state.store.references().lookup(&reference_key).await?;
    let content = state.store.blobs().get(entry.blob_id).await?;
    blob_response(content, &headers)
}
