//! Flat Type Driver
//!
//! Untagged networks. A physical network carries at most one flat network.

use async_trait::async_trait;

use super::{reserve_exact, TYPE_FLAT};
use crate::domain::gateways::{NetworkTransaction, TypeDriver};
use crate::domain::models::segment::SegmentSpec;
use crate::shared::errors::SegmentError;

/// Matches any physical network in `flat_networks`
const ANY_PHYSNET: &str = "*";

pub struct FlatTypeDriver {
    flat_networks: Vec<String>,
    mtu: u32,
}

impl FlatTypeDriver {
    #[must_use]
    pub fn new(flat_networks: Vec<String>, mtu: u32) -> Self {
        Self { flat_networks, mtu }
    }

    fn allows(&self, physical_network: &str) -> bool {
        self.flat_networks
            .iter()
            .any(|allowed| allowed == ANY_PHYSNET || allowed == physical_network)
    }
}

#[async_trait]
impl TypeDriver for FlatTypeDriver {
    fn network_type(&self) -> &str {
        TYPE_FLAT
    }

    async fn reserve_provider_segment(
        &self,
        txn: &mut dyn NetworkTransaction,
        spec: &SegmentSpec,
    ) -> Result<SegmentSpec, SegmentError> {
        if spec.segment_id.is_some() {
            return Err(SegmentError::Validation(
                "segmentation_id not allowed for flat network".to_string(),
            ));
        }
        let physical_network = spec.physical_network.as_deref().ok_or_else(|| {
            SegmentError::Validation("physical_network required for flat network".to_string())
        })?;
        if !self.allows(physical_network) {
            return Err(SegmentError::Validation(format!(
                "physical_network '{physical_network}' unknown for flat network"
            )));
        }

        reserve_exact(txn, SegmentSpec::new(TYPE_FLAT, Some(physical_network), None)).await
    }

    async fn allocate_tenant_segment(
        &self,
        _txn: &mut dyn NetworkTransaction,
    ) -> Result<Option<SegmentSpec>, SegmentError> {
        Ok(None)
    }

    fn mtu(&self, _physical_network: Option<&str>) -> Option<u32> {
        Some(self.mtu)
    }
}
