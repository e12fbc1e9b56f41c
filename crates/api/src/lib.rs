//! HTTP API server for the gift catalog service.
//!
//! Provides REST endpoints for the catalog and for sending gifts, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use catalog_store::CatalogStore;
use domain::CatalogService;
use gift::{FakeGiftDelivery, GiftService};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: CatalogStore> {
    pub catalog: CatalogService<S>,
    pub gifts: GiftService<S, FakeGiftDelivery>,
}

/// Creates the application state over the given store.
pub fn create_default_state<S: CatalogStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        catalog: CatalogService::new(store.clone()),
        gifts: GiftService::new(store, FakeGiftDelivery::new()),
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: CatalogStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    let api = Router::new()
        .route(
            "/categories",
            post(routes::categories::create::<S>).get(routes::categories::list::<S>),
        )
        .route(
            "/products",
            post(routes::products::create::<S>).get(routes::products::list::<S>),
        )
        .route(
            "/products/{id}/options",
            post(routes::options::create::<S>).get(routes::options::list::<S>),
        )
        .route("/options/{id}", get(routes::options::get::<S>))
        .route("/members", post(routes::members::register::<S>))
        .route("/members/{id}", get(routes::members::get::<S>))
        .route("/gifts", post(routes::gifts::send::<S>));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", api)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
