use std::sync::Arc;

use matchgrid_core::{
    BackendService, Config, FrontendService, QueryService, SanitizedConfig, StateStore,
    Synchronizer,
};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn StateStore>,
    frontend: FrontendService,
    backend: BackendService,
    query: Arc<QueryService>,
    synchronizer: Arc<Synchronizer>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn StateStore>,
        frontend: FrontendService,
        backend: BackendService,
        query: Arc<QueryService>,
        synchronizer: Arc<Synchronizer>,
    ) -> Self {
        Self {
            config,
            store,
            frontend,
            backend,
            query,
            synchronizer,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Get the state store (for health checks)
    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    pub fn frontend(&self) -> &FrontendService {
        &self.frontend
    }

    pub fn backend(&self) -> &BackendService {
        &self.backend
    }

    pub fn query(&self) -> &Arc<QueryService> {
        &self.query
    }

    pub fn synchronizer(&self) -> &Arc<Synchronizer> {
        &self.synchronizer
    }
}
