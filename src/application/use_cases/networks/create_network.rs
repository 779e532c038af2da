//! Create Network Use Case
//!
//! Creates a network together with its segments in one transaction.

use std::sync::Arc;

use crate::application::segments::{NetworkDictExtender, SegmentAllocator};
use crate::domain::gateways::NetworkStore;
use crate::domain::models::network::{CreateNetworkData, Network, NetworkRequest, NetworkView};
use crate::shared::errors::UseCaseError;

/// Use case for creating a new network
pub struct CreateNetworkUseCase {
    store: Arc<dyn NetworkStore>,
    allocator: Arc<SegmentAllocator>,
    extender: Arc<NetworkDictExtender>,
}

impl CreateNetworkUseCase {
    /// Create a new CreateNetworkUseCase
    #[must_use]
    pub fn new(
        store: Arc<dyn NetworkStore>,
        allocator: Arc<SegmentAllocator>,
        extender: Arc<NetworkDictExtender>,
    ) -> Self {
        Self {
            store,
            allocator,
            extender,
        }
    }

    /// Execute the use case
    ///
    /// # Errors
    ///
    /// Returns `UseCaseError::Segment` if a segment cannot be resolved or reserved;
    /// nothing is persisted in that case.
    /// Returns `UseCaseError::Repository` if there's a database error.
    pub async fn execute(&self, data: CreateNetworkData) -> Result<NetworkView, UseCaseError> {
        tracing::info!(
            name = %data.name,
            tenant_id = %data.tenant_id,
            external = ?data.external,
            segments = data.segments.len(),
            "Creating new network"
        );

        let network = Network::new(&data);
        let request = NetworkRequest::new(&network, data.segments);

        let mut txn = self.store.begin().await?;
        txn.insert_network(&network).await?;
        let mtu = self
            .allocator
            .create_network_segments(&mut *txn, &request, network.tenant_id())
            .await?;
        txn.set_network_mtu(network.id(), mtu).await?;
        txn.commit().await?;

        let network = network.with_mtu(mtu);
        tracing::info!(network_id = %network.id(), mtu = ?mtu, "Network created successfully");

        let id = network.id().to_string();
        self.extender
            .extend_networks_dict_provider(vec![NetworkView::from(network)])
            .await?
            .pop()
            .ok_or_else(|| UseCaseError::NotFound {
                resource: "Network".to_string(),
                id,
            })
    }
}
