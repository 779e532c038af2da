//! Get Network By ID Use Case
//!
//! Retrieves a single network by its ID, extended with provider attributes.

use std::sync::Arc;

use crate::application::segments::NetworkDictExtender;
use crate::domain::gateways::NetworkStore;
use crate::domain::models::network::{NetworkId, NetworkView};
use crate::shared::errors::UseCaseError;

/// Use case for getting a network by ID
pub struct GetNetworkByIdUseCase {
    store: Arc<dyn NetworkStore>,
    extender: Arc<NetworkDictExtender>,
}

impl GetNetworkByIdUseCase {
    /// Create a new GetNetworkByIdUseCase
    #[must_use]
    pub fn new(store: Arc<dyn NetworkStore>, extender: Arc<NetworkDictExtender>) -> Self {
        Self { store, extender }
    }

    /// Execute the use case
    ///
    /// # Errors
    ///
    /// Returns `UseCaseError::NotFound` if the network doesn't exist.
    /// Returns `UseCaseError::Repository` if there's a database error.
    pub async fn execute(&self, id: &NetworkId) -> Result<NetworkView, UseCaseError> {
        tracing::debug!(network_id = %id, "Getting network by ID");

        let not_found = || UseCaseError::NotFound {
            resource: "Network".to_string(),
            id: id.to_string(),
        };

        let network = self.store.find_by_id(id).await?.ok_or_else(|| {
            tracing::warn!(network_id = %id, "Network not found");
            not_found()
        })?;

        self.extender
            .extend_networks_dict_provider(vec![NetworkView::from(network)])
            .await?
            .pop()
            .ok_or_else(not_found)
    }
}
