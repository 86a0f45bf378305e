use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;

/// Connect and bring the schema up to date.
///
/// Tables and their unique indexes (`blob.content_hash`,
/// `reference_pdf.reference_key`, `letter_pdf.letter`) are created from the
/// entity definitions, so deduplication and key uniqueness are enforced by the
/// database itself.
pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.clone());

    opt.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("libras_server::entity::*")
        .sync(&db)
        .await?;

    info!(backend = ?db.get_database_backend(), "database schema synchronized");
    Ok(db)
}
