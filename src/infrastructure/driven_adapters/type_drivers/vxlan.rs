//! VXLAN Type Driver

use async_trait::async_trait;

use super::{allocate_from_ranges, parse_bounded_range, reserve_exact, TYPE_VXLAN};
use crate::domain::gateways::{NetworkTransaction, TypeDriver};
use crate::domain::models::segment::{SegmentRange, SegmentSpec};
use crate::shared::errors::SegmentError;

pub const MIN_VNI: u32 = 1;
pub const MAX_VNI: u32 = (1 << 24) - 1;

/// Outer IPv4 + UDP + VXLAN headers
const VXLAN_ENCAP_OVERHEAD: u32 = 50;

pub struct VxlanTypeDriver {
    ranges: Vec<SegmentRange>,
    mtu: u32,
}

impl VxlanTypeDriver {
    /// Parse `vni_ranges` entries.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first malformed entry.
    pub fn new(entries: &[String], physnet_mtu: u32) -> Result<Self, String> {
        let ranges = entries
            .iter()
            .map(|entry| {
                parse_bounded_range(entry, MIN_VNI, MAX_VNI)
                    .map_err(|e| format!("vni_ranges entry '{entry}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            ranges,
            mtu: physnet_mtu.saturating_sub(VXLAN_ENCAP_OVERHEAD),
        })
    }
}

#[async_trait]
impl TypeDriver for VxlanTypeDriver {
    fn network_type(&self) -> &str {
        TYPE_VXLAN
    }

    async fn reserve_provider_segment(
        &self,
        txn: &mut dyn NetworkTransaction,
        spec: &SegmentSpec,
    ) -> Result<SegmentSpec, SegmentError> {
        if spec.physical_network.is_some() {
            return Err(SegmentError::Validation(
                "physical_network not allowed for VXLAN network".to_string(),
            ));
        }

        match spec.segment_id {
            Some(vni) if !(MIN_VNI..=MAX_VNI).contains(&vni) => Err(SegmentError::Validation(format!(
                "segmentation_id {vni} out of range ({MIN_VNI} through {MAX_VNI})"
            ))),
            Some(vni) => reserve_exact(txn, SegmentSpec::new(TYPE_VXLAN, None, Some(vni))).await,
            None => self
                .allocate_tenant_segment(txn)
                .await?
                .ok_or_else(|| SegmentError::ResourceExhausted(vec![TYPE_VXLAN.to_string()])),
        }
    }

    async fn allocate_tenant_segment(
        &self,
        txn: &mut dyn NetworkTransaction,
    ) -> Result<Option<SegmentSpec>, SegmentError> {
        allocate_from_ranges(txn, TYPE_VXLAN, self.ranges.iter().copied().map(|range| (None, range))).await
    }

    fn mtu(&self, _physical_network: Option<&str>) -> Option<u32> {
        Some(self.mtu)
    }
}
