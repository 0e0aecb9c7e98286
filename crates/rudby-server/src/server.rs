use rudby_catalog::{CatalogService, RecordStore, SerialNumberAllocator};
use rudby_gate::OwnershipGate;
use rudby_store::StoreHandle;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, AppState};

/// Rudby catalog server.
pub struct RudbyServer {
    config: ServerConfig,
}

impl RudbyServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Wire a catalog service over `store` according to the configuration.
    pub fn catalog(&self, store: StoreHandle) -> CatalogService {
        let allocator = SerialNumberAllocator::with_counter_key(store.clone(), &self.config.counter_key);
        let records = RecordStore::with_allocator(store, allocator, &self.config.collection);
        let gate = OwnershipGate::with_default_stages(self.config.gate.clone());
        CatalogService::new(records, gate)
    }

    /// Shared handler state over `store` (useful for testing).
    pub fn state(&self, store: StoreHandle) -> AppState {
        AppState::new(self.catalog(store), self.config.auth())
    }

    /// Open the configured store and serve requests until ctrl-c, then
    /// close the store.
    pub async fn serve(self) -> ServerResult<()> {
        let store = self.config.storage.open().await?;
        let state = self.state(store);
        let catalog = state.catalog.clone();
        if self.config.tokens.is_empty() {
            tracing::warn!("no bearer tokens configured; every catalog request will be rejected");
        }

        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("Rudby server listening on {}", self.config.bind_addr);
        let served = axum::serve(listener, build_router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()));

        catalog.shutdown().await?;
        tracing::info!("Rudby server stopped");
        served
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
