//! Network Handlers
//!
//! HTTP handlers for network creation and reads.
//! All endpoints require JWT authentication.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::network::NetworkId;
use crate::infrastructure::driving_adapters::api_rest::dto::network::{
    CreateNetworkDto, NetworkResponseDto,
};
use crate::infrastructure::driving_adapters::api_rest::middleware::auth::JwtAuth;
use crate::infrastructure::driving_adapters::api_rest::AppState;
use crate::shared::errors::ApiError;

/// Create the router for network endpoints
///
/// All routes require JWT authentication via the `JwtAuth` extractor.
/// The `add_config_extension` middleware injects the config into request extensions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_networks).post(create_network))
        .route("/:id", get(get_network_by_id))
}

/// POST /networks - Create a network and its segments
///
/// # Responses
///
/// * 201 Created - Network created with its segments
/// * 400 Bad Request - Validation error or unsupported network type
/// * 401 Unauthorized - Missing or invalid JWT token
/// * 409 Conflict - A requested segment is already in use
/// * 503 Service Unavailable - No tenant segment left in any pool
#[axum::debug_handler]
async fn create_network(
    JwtAuth(user): JwtAuth,
    State(state): State<AppState>,
    Json(dto): Json<CreateNetworkDto>,
) -> Result<(StatusCode, Json<NetworkResponseDto>), ApiError> {
    dto.validate()?;

    let network = state
        .create_network_use_case
        .execute(dto.into_create_data(user.tenant_id))
        .await?;

    Ok((StatusCode::CREATED, Json(NetworkResponseDto::from(network))))
}

/// GET /networks - List networks sorted by name
///
/// # Responses
///
/// * 200 OK - Networks with provider attributes
/// * 401 Unauthorized - Missing or invalid JWT token
#[axum::debug_handler]
async fn list_networks(
    _auth: JwtAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<NetworkResponseDto>>, ApiError> {
    let networks = state.list_networks_use_case.execute().await?;

    Ok(Json(networks.into_iter().map(NetworkResponseDto::from).collect()))
}

/// GET /networks/:id - Get a network by ID
///
/// # Responses
///
/// * 200 OK - Network found
/// * 400 Bad Request - Malformed ID
/// * 401 Unauthorized - Missing or invalid JWT token
/// * 404 Not Found - Network does not exist
#[axum::debug_handler]
async fn get_network_by_id(
    _auth: JwtAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NetworkResponseDto>, ApiError> {
    let network_id = NetworkId::from_uuid(Uuid::parse_str(&id)?);

    let network = state.get_network_by_id_use_case.execute(&network_id).await?;

    Ok(Json(NetworkResponseDto::from(network)))
}
