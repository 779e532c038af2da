//! REST API Module
//!
//! Contains HTTP handlers, DTOs, and middleware for the REST API.

pub mod dto;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::use_cases::networks::{
    CreateNetworkUseCase, GetNetworkByIdUseCase, ListNetworksUseCase,
};
use crate::infrastructure::driven_adapters::config::AppConfig;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub create_network_use_case: Arc<CreateNetworkUseCase>,
    pub get_network_by_id_use_case: Arc<GetNetworkByIdUseCase>,
    pub list_networks_use_case: Arc<ListNetworksUseCase>,
}

/// Build the HTTP application: `/networks` routes plus config injection,
/// request correlation, tracing and CORS layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/networks", handlers::networks::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::add_config_extension,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
