//! Taxonomy inspection and reload endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use bilancio_core::taxonomy::{ExpectedSign, NodeId, Taxonomy, TaxonomyNode};
use bilancio_import::load_taxonomy;
use bilancio_shared::AppError;
use serde::Serialize;
use tracing::{error, warn};

use crate::{ApiError, AppState};

/// Creates taxonomy routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/taxonomy", get(get_taxonomy))
        .route("/taxonomy/nodes/{id}", get(get_node))
        .route("/taxonomy/reload", post(reload_taxonomy))
}

// ============================================================================
// Response Types
// ============================================================================

/// Taxonomy overview.
#[derive(Debug, Serialize)]
pub struct TaxonomyResponse {
    /// Taxonomy name.
    pub name: String,
    /// Number of nodes.
    pub node_count: usize,
    /// Number of compiled rules.
    pub rule_count: usize,
    /// Nodes in taxonomy (pre-)order.
    pub nodes: Vec<NodeResponse>,
}

/// One taxonomy node.
#[derive(Debug, Serialize)]
pub struct NodeResponse {
    /// Node id.
    pub id: NodeId,
    /// Display label.
    pub label: String,
    /// Parent id, absent for section roots.
    pub parent: Option<NodeId>,
    /// Depth below the section root.
    pub depth: usize,
    /// Balance side the node's amounts are normalized to.
    pub sign: ExpectedSign,
    /// Cross-check formula source, if any.
    pub formula: Option<String>,
    /// Whether a formula mismatch is an error.
    pub critical: bool,
    /// Direct children ids.
    pub children: Vec<NodeId>,
    /// Human-readable rules routing amounts to this node.
    pub rules: Vec<String>,
}

impl NodeResponse {
    fn new(taxonomy: &Taxonomy, node: &TaxonomyNode) -> Self {
        Self {
            id: node.id.clone(),
            label: node.label.clone(),
            parent: node.parent.clone(),
            depth: node.depth,
            sign: node.effective_sign,
            formula: node.formula.as_ref().map(|f| f.source.clone()),
            critical: node.critical,
            children: taxonomy
                .children(node.id.as_str())
                .map(|child| child.id.clone())
                .collect(),
            rules: taxonomy
                .rules_for(node.id.as_str())
                .map(|indexed| indexed.rule.describe())
                .collect(),
        }
    }
}

/// Result of a reload.
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    /// Name of the taxonomy now in use.
    pub name: String,
    /// Number of nodes.
    pub node_count: usize,
    /// Number of compiled rules.
    pub rule_count: usize,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /taxonomy
async fn get_taxonomy(State(state): State<AppState>) -> Json<TaxonomyResponse> {
    let taxonomy = state.taxonomy.snapshot();
    Json(TaxonomyResponse {
        name: taxonomy.name().to_string(),
        node_count: taxonomy.len(),
        rule_count: taxonomy.rules().len(),
        nodes: taxonomy
            .nodes()
            .iter()
            .map(|node| NodeResponse::new(&taxonomy, node))
            .collect(),
    })
}

/// GET /taxonomy/nodes/{id}
async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NodeResponse>, ApiError> {
    let taxonomy = state.taxonomy.snapshot();
    let node = taxonomy.lookup(&id)?;
    Ok(Json(NodeResponse::new(&taxonomy, node)))
}

/// POST /taxonomy/reload
///
/// Rebuilds the taxonomy from the configured schema file. On failure the
/// previous taxonomy stays active and the schema error is returned.
async fn reload_taxonomy(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ApiError> {
    let store = state.taxonomy.clone();
    let path = state.schema_path.clone();

    let reloaded = tokio::task::spawn_blocking(move || {
        store.reload_with(|| load_taxonomy(path.as_deref()))
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Reload task failed");
        AppError::Internal("reload task failed".to_string())
    })?
    .map_err(|e| {
        warn!(error = %e, "Taxonomy reload rejected, keeping current taxonomy");
        e
    })?;

    Ok(Json(ReloadResponse {
        name: reloaded.name().to_string(),
        node_count: reloaded.len(),
        rule_count: reloaded.rules().len(),
    }))
}
