//! Local Type Driver
//!
//! Host-local networks with no transport at all. Nothing is reserved, so any
//! number of networks may be local.

use async_trait::async_trait;

use super::TYPE_LOCAL;
use crate::domain::gateways::{NetworkTransaction, TypeDriver};
use crate::domain::models::segment::SegmentSpec;
use crate::shared::errors::SegmentError;

pub struct LocalTypeDriver;

#[async_trait]
impl TypeDriver for LocalTypeDriver {
    fn network_type(&self) -> &str {
        TYPE_LOCAL
    }

    async fn reserve_provider_segment(
        &self,
        _txn: &mut dyn NetworkTransaction,
        spec: &SegmentSpec,
    ) -> Result<SegmentSpec, SegmentError> {
        if spec.physical_network.is_some() {
            return Err(SegmentError::Validation(
                "physical_network not allowed for local network".to_string(),
            ));
        }
        if spec.segment_id.is_some() {
            return Err(SegmentError::Validation(
                "segmentation_id not allowed for local network".to_string(),
            ));
        }
        Ok(SegmentSpec::new(TYPE_LOCAL, None, None))
    }

    async fn allocate_tenant_segment(
        &self,
        _txn: &mut dyn NetworkTransaction,
    ) -> Result<Option<SegmentSpec>, SegmentError> {
        Ok(Some(SegmentSpec::new(TYPE_LOCAL, None, None)))
    }

    fn mtu(&self, _physical_network: Option<&str>) -> Option<u32> {
        None
    }
}
