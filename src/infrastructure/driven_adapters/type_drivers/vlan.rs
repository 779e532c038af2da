//! VLAN Type Driver
//!
//! 802.1Q tagged networks. Configured as `physnet:min:max` entries, which put
//! a tag range into the tenant pool, or bare `physnet` entries, which only
//! allow provider networks on that physical network.

use async_trait::async_trait;

use super::{allocate_from_ranges, parse_bounded_range, reserve_exact, TYPE_VLAN};
use crate::domain::gateways::{NetworkTransaction, TypeDriver};
use crate::domain::models::segment::{SegmentRange, SegmentSpec};
use crate::shared::errors::SegmentError;

pub const MIN_VLAN_TAG: u32 = 1;
pub const MAX_VLAN_TAG: u32 = 4094;

pub struct VlanTypeDriver {
    physical_networks: Vec<String>,
    ranges: Vec<(String, SegmentRange)>,
    mtu: u32,
}

impl VlanTypeDriver {
    /// Parse `network_vlan_ranges` entries.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first malformed entry.
    pub fn new(entries: &[String], mtu: u32) -> Result<Self, String> {
        let mut physical_networks: Vec<String> = Vec::new();
        let mut ranges = Vec::new();

        for entry in entries {
            let (physical_network, range) = match entry.split_once(':') {
                None => (entry.trim(), None),
                Some((physical_network, range)) => (
                    physical_network.trim(),
                    Some(
                        parse_bounded_range(range, MIN_VLAN_TAG, MAX_VLAN_TAG)
                            .map_err(|e| format!("network_vlan_ranges entry '{entry}': {e}"))?,
                    ),
                ),
            };
            if physical_network.is_empty() {
                return Err(format!(
                    "network_vlan_ranges entry '{entry}' has no physical network"
                ));
            }
            if !physical_networks.iter().any(|known| known == physical_network) {
                physical_networks.push(physical_network.to_string());
            }
            if let Some(range) = range {
                ranges.push((physical_network.to_string(), range));
            }
        }

        tracing::debug!(
            physical_networks = ?physical_networks,
            ranges = ranges.len(),
            "VLAN ranges loaded"
        );
        Ok(Self {
            physical_networks,
            ranges,
            mtu,
        })
    }

    fn ranges_on<'a>(
        &'a self,
        physical_network: &'a str,
    ) -> impl Iterator<Item = (Option<&'a str>, SegmentRange)> + 'a {
        self.ranges
            .iter()
            .filter(move |(name, _)| name == physical_network)
            .map(|(name, range)| (Some(name.as_str()), *range))
    }

    fn all_ranges(&self) -> impl Iterator<Item = (Option<&str>, SegmentRange)> + '_ {
        self.ranges
            .iter()
            .map(|(name, range)| (Some(name.as_str()), *range))
    }

    fn exhausted() -> SegmentError {
        SegmentError::ResourceExhausted(vec![TYPE_VLAN.to_string()])
    }
}

#[async_trait]
impl TypeDriver for VlanTypeDriver {
    fn network_type(&self) -> &str {
        TYPE_VLAN
    }

    async fn reserve_provider_segment(
        &self,
        txn: &mut dyn NetworkTransaction,
        spec: &SegmentSpec,
    ) -> Result<SegmentSpec, SegmentError> {
        let Some(physical_network) = spec.physical_network.as_deref() else {
            if spec.segment_id.is_some() {
                return Err(SegmentError::Validation(
                    "segmentation_id requires physical_network for VLAN provider network".to_string(),
                ));
            }
            return allocate_from_ranges(txn, TYPE_VLAN, self.all_ranges())
                .await?
                .ok_or_else(Self::exhausted);
        };

        if !self.physical_networks.iter().any(|known| known == physical_network) {
            return Err(SegmentError::Validation(format!(
                "physical_network '{physical_network}' unknown for VLAN provider network"
            )));
        }

        match spec.segment_id {
            Some(tag) if !(MIN_VLAN_TAG..=MAX_VLAN_TAG).contains(&tag) => {
                Err(SegmentError::Validation(format!(
                    "segmentation_id {tag} out of range ({MIN_VLAN_TAG} through {MAX_VLAN_TAG})"
                )))
            }
            Some(tag) => {
                reserve_exact(txn, SegmentSpec::new(TYPE_VLAN, Some(physical_network), Some(tag))).await
            }
            None => allocate_from_ranges(txn, TYPE_VLAN, self.ranges_on(physical_network))
                .await?
                .ok_or_else(Self::exhausted),
        }
    }

    async fn allocate_tenant_segment(
        &self,
        txn: &mut dyn NetworkTransaction,
    ) -> Result<Option<SegmentSpec>, SegmentError> {
        allocate_from_ranges(txn, TYPE_VLAN, self.all_ranges()).await
    }

    fn mtu(&self, _physical_network: Option<&str>) -> Option<u32> {
        Some(self.mtu)
    }
}
