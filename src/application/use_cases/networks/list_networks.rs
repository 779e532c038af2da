//! List Networks Use Case
//!
//! Retrieves all networks sorted by name, extended with provider attributes.

use std::sync::Arc;

use crate::application::segments::NetworkDictExtender;
use crate::domain::gateways::NetworkStore;
use crate::domain::models::network::NetworkView;
use crate::shared::errors::UseCaseError;

/// Use case for listing networks
pub struct ListNetworksUseCase {
    store: Arc<dyn NetworkStore>,
    extender: Arc<NetworkDictExtender>,
}

impl ListNetworksUseCase {
    /// Create a new ListNetworksUseCase
    #[must_use]
    pub fn new(store: Arc<dyn NetworkStore>, extender: Arc<NetworkDictExtender>) -> Self {
        Self { store, extender }
    }

    /// Execute the use case
    ///
    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if there's a database error.
    pub async fn execute(&self) -> Result<Vec<NetworkView>, UseCaseError> {
        tracing::debug!("Listing networks");

        let networks = self.store.find_all().await?;
        let views = self
            .extender
            .extend_networks_dict_provider(networks.into_iter().map(NetworkView::from).collect())
            .await?;

        tracing::debug!(count = views.len(), "Found networks");
        Ok(views)
    }
}
