//! Built-in Type Drivers
//!
//! Drivers for the `local`, `flat`, `vlan` and `vxlan` network types, built
//! from the `segments` configuration section and handed to the registry
//! through [`BuiltinDrivers::discover`].

pub mod flat;
pub mod local;
pub mod vlan;
pub mod vxlan;

use std::sync::Arc;

use config::ConfigError;

use super::config::SegmentsConfig;
use crate::domain::gateways::{NetworkTransaction, TypeDriver};
use crate::domain::models::segment::{SegmentRange, SegmentSpec};
use crate::shared::errors::SegmentError;

pub use flat::FlatTypeDriver;
pub use local::LocalTypeDriver;
pub use vlan::VlanTypeDriver;
pub use vxlan::VxlanTypeDriver;

pub const TYPE_LOCAL: &str = "local";
pub const TYPE_FLAT: &str = "flat";
pub const TYPE_VLAN: &str = "vlan";
pub const TYPE_VXLAN: &str = "vxlan";

/// Every driver this crate ships, constructed once from configuration
pub struct BuiltinDrivers {
    local: Arc<dyn TypeDriver>,
    flat: Arc<dyn TypeDriver>,
    vlan: Arc<dyn TypeDriver>,
    vxlan: Arc<dyn TypeDriver>,
}

impl BuiltinDrivers {
    /// Build the drivers, parsing their ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` for a malformed range entry.
    pub fn from_config(config: &SegmentsConfig) -> Result<Self, ConfigError> {
        let mtu = config.global_physnet_mtu;
        Ok(Self {
            local: Arc::new(LocalTypeDriver),
            flat: Arc::new(FlatTypeDriver::new(config.flat_networks.clone(), mtu)),
            vlan: Arc::new(
                VlanTypeDriver::new(&config.network_vlan_ranges, mtu).map_err(ConfigError::Message)?,
            ),
            vxlan: Arc::new(VxlanTypeDriver::new(&config.vni_ranges, mtu).map_err(ConfigError::Message)?),
        })
    }

    /// Resolve a configured driver name
    #[must_use]
    pub fn discover(&self, name: &str) -> Option<Arc<dyn TypeDriver>> {
        match name {
            TYPE_LOCAL => Some(self.local.clone()),
            TYPE_FLAT => Some(self.flat.clone()),
            TYPE_VLAN => Some(self.vlan.clone()),
            TYPE_VXLAN => Some(self.vxlan.clone()),
            _ => None,
        }
    }
}

/// Driver factory for [`TypeDriverRegistry::load`](crate::application::segments::TypeDriverRegistry::load)
///
/// # Errors
///
/// Returns `ConfigError::Message` for a malformed range entry.
pub fn discover(
    config: &SegmentsConfig,
) -> Result<impl Fn(&str) -> Option<Arc<dyn TypeDriver>>, ConfigError> {
    let drivers = BuiltinDrivers::from_config(config)?;
    Ok(move |name: &str| drivers.discover(name))
}

/// Mark `spec` as in use, failing with a conflict if another network holds it
async fn reserve_exact(
    txn: &mut dyn NetworkTransaction,
    spec: SegmentSpec,
) -> Result<SegmentSpec, SegmentError> {
    let key = spec.key();
    if txn.reserve_segment(&key).await? {
        Ok(spec)
    } else {
        tracing::warn!(segment = %key, "Segment already reserved");
        Err(SegmentError::SegmentConflict(key))
    }
}

/// Take the lowest free id from the first range that still has one
async fn allocate_from_ranges<'a, I>(
    txn: &mut dyn NetworkTransaction,
    network_type: &str,
    ranges: I,
) -> Result<Option<SegmentSpec>, SegmentError>
where
    I: IntoIterator<Item = (Option<&'a str>, SegmentRange)>,
{
    for (physical_network, range) in ranges {
        if let Some(segment_id) = txn
            .allocate_segment_id(network_type, physical_network, range)
            .await?
        {
            return Ok(Some(SegmentSpec::new(network_type, physical_network, Some(segment_id))));
        }
    }
    Ok(None)
}

/// Parse `min:max` and check it lies within `[lowest, highest]`
fn parse_bounded_range(entry: &str, lowest: u32, highest: u32) -> Result<SegmentRange, String> {
    let range: SegmentRange = entry.parse()?;
    if range.min < lowest || range.max > highest {
        return Err(format!("range '{entry}' is outside {lowest}..={highest}"));
    }
    Ok(range)
}
