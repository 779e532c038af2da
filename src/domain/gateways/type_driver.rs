//! Type Driver Gateway
//!
//! Capability owning validation, reservation and pool allocation for one
//! segment encapsulation type.

use async_trait::async_trait;

use crate::domain::gateways::network_store::NetworkTransaction;
use crate::domain::models::segment::SegmentSpec;
use crate::shared::errors::SegmentError;

#[async_trait]
pub trait TypeDriver: Send + Sync {
    /// Network type this driver owns, e.g. `vlan`
    fn network_type(&self) -> &str;

    /// Validate a caller-supplied specification, fill in the fields this
    /// driver is responsible for, and mark the concrete segment as in use
    /// inside `txn`.
    ///
    /// # Errors
    ///
    /// `SegmentError::Validation` for malformed specifications,
    /// `SegmentError::SegmentConflict` if the segment is already reserved,
    /// `SegmentError::ResourceExhausted` if a field had to be allocated and
    /// nothing was free.
    async fn reserve_provider_segment(
        &self,
        txn: &mut dyn NetworkTransaction,
        spec: &SegmentSpec,
    ) -> Result<SegmentSpec, SegmentError>;

    /// Draw an unused segment from this type's shared pool.
    /// Returns `None` when the pool is exhausted or the type has no pool.
    async fn allocate_tenant_segment(
        &self,
        txn: &mut dyn NetworkTransaction,
    ) -> Result<Option<SegmentSpec>, SegmentError>;

    /// MTU available to a segment of this type on `physical_network`
    fn mtu(&self, physical_network: Option<&str>) -> Option<u32>;
}
