//! Network Segment Registry API - Main Entry Point

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use network_segment_registry::application::segments::{
    NetworkDictExtender, SegmentAllocator, TypeDriverRegistry,
};
use network_segment_registry::application::use_cases::networks::{
    CreateNetworkUseCase, GetNetworkByIdUseCase, ListNetworksUseCase,
};
use network_segment_registry::domain::gateways::NetworkStore;
use network_segment_registry::infrastructure::driven_adapters::config::AppConfig;
use network_segment_registry::infrastructure::driven_adapters::database::create_pool;
use network_segment_registry::infrastructure::driven_adapters::network_store::PostgresNetworkStore;
use network_segment_registry::infrastructure::driven_adapters::type_drivers;
use network_segment_registry::infrastructure::driving_adapters::api_rest::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "network_segment_registry=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    tracing::info!("Configuration loaded successfully");

    let pool = create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations completed");

    // Type drivers and registry are fixed for the life of the process
    let segments = &config.segments;
    let registry = Arc::new(TypeDriverRegistry::load(
        &segments.type_drivers,
        type_drivers::discover(segments)?,
        &segments.tenant_network_types,
    )?);

    let store: Arc<dyn NetworkStore> = Arc::new(PostgresNetworkStore::new(pool));
    let allocator = Arc::new(SegmentAllocator::new(registry));
    let extender = Arc::new(NetworkDictExtender::new(store.clone()));

    let app_state = AppState {
        config: Arc::new(config.clone()),
        create_network_use_case: Arc::new(CreateNetworkUseCase::new(
            store.clone(),
            allocator,
            extender.clone(),
        )),
        get_network_by_id_use_case: Arc::new(GetNetworkByIdUseCase::new(store.clone(), extender.clone())),
        list_networks_use_case: Arc::new(ListNetworksUseCase::new(store, extender)),
    };

    let app = api_rest::app(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
