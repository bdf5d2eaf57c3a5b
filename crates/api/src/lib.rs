//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - Classification endpoint running the pipeline off the async executor
//! - Taxonomy inspection and hot reload endpoints
//! - JSON error responses, including rejected request bodies

pub mod error;
pub mod extract;
pub mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use bilancio_core::{ClassificationPipeline, TaxonomyStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use extract::ApiJson;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Active taxonomy, swapped atomically on reload.
    pub taxonomy: Arc<TaxonomyStore>,
    /// Pipeline settings applied to every run.
    pub pipeline: ClassificationPipeline,
    /// Schema file reloads read from; `None` reloads the built-in taxonomy.
    pub schema_path: Option<PathBuf>,
    /// Maximum accepted request body in bytes.
    pub body_limit_bytes: usize,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.body_limit_bytes;
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
