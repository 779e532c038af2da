//! Network Store Gateway
//!
//! Transactional contract for network and segment persistence. Reservation
//! of a segment key is an atomic check-and-mark performed by the store, so
//! concurrent writers in separate processes cannot both win the same key.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::models::network::{Network, NetworkId};
use crate::domain::models::segment::{NetworkSegment, SegmentKey, SegmentRange};
use crate::shared::errors::RepositoryError;

/// A unit of work over the store.
///
/// Dropping a transaction without calling [`NetworkTransaction::commit`]
/// rolls back every write and reservation made through it.
#[async_trait]
pub trait NetworkTransaction: Send {
    /// Insert a new network row
    async fn insert_network(&mut self, network: &Network) -> Result<(), RepositoryError>;

    /// Record the aggregate MTU of a network inserted in this transaction
    async fn set_network_mtu(&mut self, id: &NetworkId, mtu: Option<u32>) -> Result<(), RepositoryError>;

    /// Mark `key` as in use. Returns `false` if another holder already has it.
    async fn reserve_segment(&mut self, key: &SegmentKey) -> Result<bool, RepositoryError>;

    /// Reserve the lowest free segment id of `range` for the given type and
    /// physical network. Returns `None` when the range is fully used.
    async fn allocate_segment_id(
        &mut self,
        network_type: &str,
        physical_network: Option<&str>,
        range: SegmentRange,
    ) -> Result<Option<u32>, RepositoryError>;

    /// Persist one resolved segment of a network
    async fn add_network_segment(&mut self, segment: &NetworkSegment) -> Result<(), RepositoryError>;

    /// Make every write of this transaction visible
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Store trait for network persistence and reads
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NetworkStore: Send + Sync {
    /// Open a new transaction
    async fn begin(&self) -> Result<Box<dyn NetworkTransaction>, RepositoryError>;

    /// Find a network by its ID
    async fn find_by_id(&self, id: &NetworkId) -> Result<Option<Network>, RepositoryError>;

    /// Find all networks, sorted by name ascending
    async fn find_all(&self) -> Result<Vec<Network>, RepositoryError>;

    /// Persisted segments of the given networks, each list ordered by segment index.
    /// Networks without segments are absent from the map.
    async fn find_segments(
        &self,
        ids: &[NetworkId],
    ) -> Result<HashMap<NetworkId, Vec<NetworkSegment>>, RepositoryError>;
}
