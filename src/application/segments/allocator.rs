//! Segment Allocator
//!
//! Creates the segment set of a new network inside the caller's transaction:
//! external networks are skipped, caller-specified provider segments are
//! reserved in order, and networks without any get one tenant pool segment.

use std::sync::Arc;

use super::classifier::is_external;
use super::registry::TypeDriverRegistry;
use crate::domain::gateways::{NetworkTransaction, TypeDriver};
use crate::domain::models::network::{NetworkId, NetworkRequest};
use crate::domain::models::segment::{NetworkSegment, SegmentSpec};
use crate::shared::errors::SegmentError;

pub struct SegmentAllocator {
    registry: Arc<TypeDriverRegistry>,
}

impl SegmentAllocator {
    #[must_use]
    pub fn new(registry: Arc<TypeDriverRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve and persist the segments of `network` through `txn`.
    ///
    /// Returns the smallest MTU reported for the persisted segments. Nothing
    /// is committed here; on error the caller drops `txn` and every
    /// reservation made so far is rolled back with it.
    ///
    /// # Errors
    ///
    /// Propagates any `SegmentError` raised by the registry or a driver.
    pub async fn create_network_segments(
        &self,
        txn: &mut dyn NetworkTransaction,
        network: &NetworkRequest,
        tenant_id: &str,
    ) -> Result<Option<u32>, SegmentError> {
        if is_external(network) {
            tracing::debug!(network_id = %network.id, "Skipping segment allocation for external network");
            return Ok(None);
        }

        let mut mtus = Vec::with_capacity(network.segments.len().max(1));

        if network.segments.is_empty() {
            let (driver, segment) = self.allocate_tenant_segment(txn, tenant_id).await?;
            mtus.push(add_network_segment(txn, network.id, 0, driver.as_ref(), segment).await?);
        } else {
            for (index, spec) in network.segments.iter().enumerate() {
                let segment_index = u32::try_from(index)
                    .map_err(|_| SegmentError::Validation("too many segments".to_string()))?;
                let driver = self.registry.lookup(&spec.network_type)?;
                let segment = driver.reserve_provider_segment(txn, spec).await?;
                mtus.push(add_network_segment(txn, network.id, segment_index, driver.as_ref(), segment).await?);
            }
        }

        let mtu = mtus.into_iter().flatten().min();
        tracing::info!(
            network_id = %network.id,
            tenant_id = %tenant_id,
            mtu = ?mtu,
            "Network segments created"
        );
        Ok(mtu)
    }

    async fn allocate_tenant_segment(
        &self,
        txn: &mut dyn NetworkTransaction,
        tenant_id: &str,
    ) -> Result<(&Arc<dyn TypeDriver>, SegmentSpec), SegmentError> {
        for network_type in self.registry.tenant_network_types() {
            let driver = self.registry.lookup(network_type)?;
            if let Some(segment) = driver.allocate_tenant_segment(txn).await? {
                return Ok((driver, segment));
            }
            tracing::debug!(network_type = %network_type, "Tenant pool exhausted, trying next type");
        }

        tracing::warn!(tenant_id = %tenant_id, "No tenant network type could allocate a segment");
        Err(SegmentError::ResourceExhausted(
            self.registry.tenant_network_types().to_vec(),
        ))
    }
}

async fn add_network_segment(
    txn: &mut dyn NetworkTransaction,
    network_id: NetworkId,
    segment_index: u32,
    driver: &dyn TypeDriver,
    segment: SegmentSpec,
) -> Result<Option<u32>, SegmentError> {
    let mtu = driver.mtu(segment.physical_network.as_deref());
    let record = NetworkSegment::new(network_id, segment_index, segment, mtu);
    txn.add_network_segment(&record).await?;

    tracing::debug!(
        network_id = %network_id,
        segment_index,
        network_type = %record.network_type,
        physical_network = ?record.physical_network,
        segment_id = ?record.segment_id,
        "Added network segment"
    );
    Ok(mtu)
}
