//! Shared taxonomy snapshot.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use super::model::Taxonomy;

/// Holds the taxonomy every classification run reads.
///
/// Runs take an [`Arc`] snapshot and keep using it even if a reload happens
/// meanwhile. A reload swaps the whole snapshot under the write lock, so no
/// reader sees a half-built taxonomy.
#[derive(Debug)]
pub struct TaxonomyStore {
    current: RwLock<Arc<Taxonomy>>,
}

impl TaxonomyStore {
    /// Creates a store holding `taxonomy`.
    #[must_use]
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            current: RwLock::new(Arc::new(taxonomy)),
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Taxonomy> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replaces the snapshot and returns the previous one.
    pub fn replace(&self, taxonomy: Taxonomy) -> Arc<Taxonomy> {
        self.install(Arc::new(taxonomy))
    }

    /// Builds a new taxonomy with `loader` and installs it.
    ///
    /// The loader runs without holding the lock. On failure the current
    /// snapshot stays in place.
    ///
    /// # Errors
    ///
    /// Returns the loader's error.
    pub fn reload_with<F, E>(&self, loader: F) -> Result<Arc<Taxonomy>, E>
    where
        F: FnOnce() -> Result<Taxonomy, E>,
    {
        let next = Arc::new(loader()?);
        info!(
            taxonomy = %next.name(),
            nodes = next.len(),
            rules = next.rules().len(),
            "Taxonomy reloaded"
        );
        self.install(Arc::clone(&next));
        Ok(next)
    }

    fn install(&self, next: Arc<Taxonomy>) -> Arc<Taxonomy> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}
