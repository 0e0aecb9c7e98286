use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::get;
use axum::Router;
use rudby_catalog::CatalogService;
use rudby_types::PrincipalId;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthProvider, Credentials};
use crate::error::ServerResult;
use crate::handler;

/// Shared per-server state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(catalog: CatalogService, auth: impl AuthProvider + 'static) -> Self {
        Self {
            catalog: Arc::new(catalog),
            auth: Arc::new(auth),
        }
    }

    /// Resolve the caller from the request headers.
    pub async fn caller(&self, headers: &HeaderMap) -> ServerResult<PrincipalId> {
        self.auth
            .authenticate(&Credentials::from_headers(headers))
            .await
    }
}

/// Build the axum router with all catalog endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route(
            "/jewelleries",
            get(handler::list_records).post(handler::create_record),
        )
        .route(
            "/jewelleries/:id",
            get(handler::get_record)
                .put(handler::update_record)
                .delete(handler::delete_record),
        )
        .route("/jewelleries/by-type/:kind", get(handler::find_by_type))
        .route(
            "/jewelleries/by-collection/:name",
            get(handler::find_by_collection),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
