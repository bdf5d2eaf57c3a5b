//! Bilancio API Server
//!
//! Serves classification runs and taxonomy management over HTTP.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bilancio_api::{AppState, create_router};
use bilancio_core::{ClassificationPipeline, PipelineOptions, TaxonomyStore};
use bilancio_import::load_taxonomy;
use bilancio_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bilancio=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let schema_path = config.classifier.schema_path.clone();
    let taxonomy = load_taxonomy(schema_path.as_deref()).context("Failed to load taxonomy")?;
    info!(
        taxonomy = %taxonomy.name(),
        nodes = taxonomy.len(),
        rules = taxonomy.rules().len(),
        "Taxonomy ready"
    );

    let options = PipelineOptions::from(&config.classifier);
    info!(
        tolerance = %options.tolerance,
        parallel_threshold = options.parallel_threshold,
        "Pipeline configured"
    );

    let state = AppState {
        taxonomy: Arc::new(TaxonomyStore::new(taxonomy)),
        pipeline: ClassificationPipeline::new(options),
        schema_path,
        body_limit_bytes: config.server.body_limit_bytes,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler the server runs until killed.
        std::future::pending::<()>().await;
    }
}
