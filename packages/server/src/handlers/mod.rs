pub mod files;
pub mod health;
pub mod letters;
pub mod pdfs;
pub mod validate;

use axum::extract::DefaultBodyLimit;

/// Body limit for multipart upload routes: the largest accepted file plus
/// room for the text fields and part headers.
pub fn upload_body_limit(max_blob_size: u64) -> DefaultBodyLimit {
    let max = usize::try_from(max_blob_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(max.saturating_add(64 * 1024))
}
