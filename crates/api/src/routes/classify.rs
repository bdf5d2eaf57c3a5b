//! Classification endpoint.

use axum::{Json, Router, extract::State, routing::post};
use bilancio_core::{ClassificationReport, InputRecord};
use bilancio_shared::AppError;
use serde::Deserialize;
use tracing::{error, info};

use crate::{ApiError, ApiJson, AppState};

/// Request body for a classification run.
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    /// Records in trial-balance order.
    pub records: Vec<InputRecord>,
}

/// POST /classify
///
/// Runs the pipeline against the taxonomy snapshot current at request time.
/// A reload that lands mid-run does not affect this report.
async fn classify(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ClassifyRequest>,
) -> Result<Json<ClassificationReport>, ApiError> {
    let taxonomy = state.taxonomy.snapshot();
    let pipeline = state.pipeline;
    info!(
        records = request.records.len(),
        taxonomy = %taxonomy.name(),
        "Classification requested"
    );

    let report = tokio::task::spawn_blocking(move || pipeline.run(&taxonomy, &request.records))
        .await
        .map_err(|e| {
            error!(error = %e, "Classification task failed");
            AppError::Internal("classification task failed".to_string())
        })?;

    Ok(Json(report))
}

/// Creates classification routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/classify", post(classify))
}
