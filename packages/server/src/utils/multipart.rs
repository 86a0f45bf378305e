use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;

use crate::error::AppError;

/// One file part of a multipart upload.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn is_pdf(&self) -> bool {
        self.content_type.as_deref() == Some("application/pdf")
    }

    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }

    pub fn size(&self) -> i64 {
        i64::try_from(self.bytes.len()).unwrap_or(i64::MAX)
    }
}

/// The declared content type of a part, or one guessed from its filename when
/// the client sent none or only `application/octet-stream`.
pub fn resolve_content_type(declared: Option<&str>, filename: Option<&str>) -> Option<String> {
    match declared.map(str::trim) {
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => Some(ct.to_string()),
        fallback => filename
            .and_then(|name| mime_guess::from_path(name).first())
            .map(|mime| mime.essence_str().to_string())
            .or_else(|| fallback.filter(|ct| !ct.is_empty()).map(str::to_string)),
    }
}

/// A body cut off by the route's length limit is a too-large upload, not a
/// malformed one.
fn read_error(err: MultipartError, context: &str, max_file_size: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge {
            actual: None,
            limit: max_file_size,
        }
    } else {
        AppError::Validation(format!("{context}: {err}"))
    }
}

/// A fully buffered multipart form: text fields and file fields by name.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl UploadForm {
    /// Read every part of `multipart`. Parts carrying a filename are files;
    /// everything else is text. Any single file larger than `max_file_size`
    /// bytes is rejected.
    pub async fn read(mut multipart: Multipart, max_file_size: u64) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| read_error(e, "Multipart error", max_file_size))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if field.file_name().is_some() {
                let filename = field.file_name().map(str::to_string);
                let content_type =
                    resolve_content_type(field.content_type(), filename.as_deref());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| read_error(e, "Upload read error", max_file_size))?;

                let actual = bytes.len() as u64;
                if actual > max_file_size {
                    return Err(AppError::PayloadTooLarge {
                        actual: Some(actual),
                        limit: max_file_size,
                    });
                }

                form.files.insert(
                    name,
                    UploadedFile {
                        filename,
                        content_type,
                        bytes,
                    },
                );
            } else {
                let text = field.text().await.map_err(|e| {
                    read_error(e, &format!("Failed to read '{name}'"), max_file_size)
                })?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    /// Trimmed text field, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}
