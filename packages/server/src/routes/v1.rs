use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let upload_limit = config.storage.max_blob_size;

    OpenApiRouter::new()
        .nest("/pdfs", pdf_routes(upload_limit))
        .nest("/letters", letter_routes(upload_limit))
        .nest("/files", file_routes())
        .nest("/validate-libras", validate_routes(upload_limit))
        .nest("/validations", validation_routes())
}

fn pdf_routes(upload_limit: u64) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::pdfs::list_pdfs,
            handlers::pdfs::upload_pdf
        ))
        .routes(routes!(handlers::pdfs::download_pdf))
        .layer(handlers::upload_body_limit(upload_limit))
}

fn letter_routes(upload_limit: u64) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::letters::list_letter_pdfs,
            handlers::letters::upload_letter_pdf
        ))
        .routes(routes!(handlers::letters::download_letter_pdf))
        .layer(handlers::upload_body_limit(upload_limit))
}

fn file_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::files::download_file))
}

fn validate_routes(upload_limit: u64) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::validate::validate_libras))
        .layer(handlers::upload_body_limit(upload_limit))
}

fn validation_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::validate::list_validations))
}
