//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod classify;
pub mod health;
pub mod taxonomy;


/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(classify::routes())
        .merge(taxonomy::routes())
}
