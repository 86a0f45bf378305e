use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemByteStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use libras_server::build_router;
use libras_server::config::AppConfig;
use libras_server::database::init_db;
use libras_server::evaluator::GeminiEvaluator;
use libras_server::state::AppState;
use libras_server::store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=info")),
        )
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = init_db(&config.database)
        .await
        .context("failed to initialise database")?;
    let bytes = FilesystemByteStore::open(config.storage.data_dir.clone(), config.storage.max_blob_size)
        .await
        .with_context(|| format!("failed to open blob store at {:?}", config.storage.data_dir))?;
    let store = Store::new(db, Arc::new(bytes));

    let evaluator =
        GeminiEvaluator::new(&config.gemini).context("failed to build model client")?;
    info!(model = %config.gemini.model, "model client ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        store: store.clone(),
        evaluator: Arc::new(evaluator),
        config,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing database connection");
    store.close().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
