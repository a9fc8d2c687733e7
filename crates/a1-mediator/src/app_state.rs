//! Shared application state for the A1 mediator.

use std::sync::Arc;

use a1_core::error::Result;

use crate::config::MediatorConfig;
use crate::obs::StoreMetrics;
use crate::sdl::SharedDataLayer;
use crate::store::PolicyStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: MediatorConfig,
    store: Arc<PolicyStore>,
    metrics: Arc<StoreMetrics>,
}

impl AppState {
    /// Build application state over an SDL backend.
    /// Returns Result so main can report a bad config instead of panicking.
    pub fn new(cfg: MediatorConfig, sdl: Arc<dyn SharedDataLayer>) -> Result<Self> {
        cfg.validate()?;

        let metrics = Arc::new(StoreMetrics::default());
        let store = Arc::new(PolicyStore::new(sdl, &cfg.store, Arc::clone(&metrics)));

        tracing::debug!(
            namespace = %cfg.store.namespace,
            list_failure = ?cfg.store.list_failure,
            "policy store ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, store, metrics }),
        })
    }

    pub fn cfg(&self) -> &MediatorConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> Arc<PolicyStore> {
        Arc::clone(&self.inner.store)
    }

    pub fn metrics(&self) -> Arc<StoreMetrics> {
        Arc::clone(&self.inner.metrics)
    }
}
