use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;
use crate::store::BlobContent;
use crate::utils::filename::content_disposition_value;

#[utoipa::path(
    get,
    path = "/{file_id}",
    tag = "Files",
    operation_id = "downloadFile",
    summary = "Download any stored blob",
    description = "Returns the bytes of a blob with the content type and filename recorded at \
        its first upload. Supports ETag-based caching via If-None-Match.",
    params(("file_id" = String, Path, description = "Blob ID")),
    responses(
        (status = 200, description = "Blob content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 404, description = "Blob not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn download_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let blob_id = parse_blob_id(&file_id)
        .ok_or_else(|| AppError::NotFound("File not found".into()))?;

    let content = state.store.blobs().get(blob_id).await?;
    blob_response(content, &headers)
}

/// Parse the public form of a blob id.
pub fn parse_blob_id(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok().filter(|id| *id > 0)
}

/// Serve blob bytes inline, keyed for caching by content hash.
pub fn blob_response(content: BlobContent, headers: &HeaderMap) -> Result<Response, AppError> {
    let etag_value = format!("\"{}\"", content.content_hash);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let content_type = if content.content_type.is_empty() {
        "application/octet-stream"
    } else {
        content.content_type.as_str()
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content.bytes.len().to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&content.filename),
        )
        .header(header::ETAG, &etag_value)
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(Body::from(content.bytes))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
