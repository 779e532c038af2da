//! In-Memory Network Store Implementation
//!
//! Process-local store with the same transactional contract as the
//! PostgreSQL store. Reservations are marked in the shared table as soon as
//! a transaction makes them, tagged with the transaction id, so a competing
//! transaction sees the key as taken immediately. Commit flips the tag;
//! dropping the transaction uncommitted removes its tags.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::gateways::{NetworkStore, NetworkTransaction};
use crate::domain::models::network::{Network, NetworkId};
use crate::domain::models::segment::{NetworkSegment, SegmentKey, SegmentRange};
use crate::shared::errors::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Holder {
    Committed,
    Pending(u64),
}

#[derive(Debug, Default)]
struct MemoryState {
    networks: HashMap<NetworkId, Network>,
    segments: HashMap<NetworkId, Vec<NetworkSegment>>,
    reservations: HashMap<SegmentKey, Holder>,
}

fn lock(state: &Mutex<MemoryState>) -> Result<MutexGuard<'_, MemoryState>, RepositoryError> {
    state
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store lock poisoned".to_string()))
}

/// In-memory implementation of NetworkStore
#[derive(Clone, Default)]
pub struct InMemoryNetworkStore {
    state: Arc<Mutex<MemoryState>>,
    next_txn: Arc<AtomicU64>,
}

impl InMemoryNetworkStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NetworkStore for InMemoryNetworkStore {
    async fn begin(&self) -> Result<Box<dyn NetworkTransaction>, RepositoryError> {
        Ok(Box::new(InMemoryNetworkTransaction {
            id: self.next_txn.fetch_add(1, Ordering::Relaxed),
            state: self.state.clone(),
            networks: Vec::new(),
            segments: Vec::new(),
            committed: false,
        }))
    }

    async fn find_by_id(&self, id: &NetworkId) -> Result<Option<Network>, RepositoryError> {
        Ok(lock(&self.state)?.networks.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Network>, RepositoryError> {
        let mut networks: Vec<Network> = lock(&self.state)?.networks.values().cloned().collect();
        networks.sort_by(|a, b| {
            a.name()
                .cmp(b.name())
                .then_with(|| a.created_at().cmp(&b.created_at()))
        });
        Ok(networks)
    }

    async fn find_segments(
        &self,
        ids: &[NetworkId],
    ) -> Result<HashMap<NetworkId, Vec<NetworkSegment>>, RepositoryError> {
        let state = lock(&self.state)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.segments.get(id).map(|segments| (*id, segments.clone())))
            .collect())
    }
}

/// Open in-memory transaction
pub struct InMemoryNetworkTransaction {
    id: u64,
    state: Arc<Mutex<MemoryState>>,
    networks: Vec<Network>,
    segments: Vec<NetworkSegment>,
    committed: bool,
}

impl Drop for InMemoryNetworkTransaction {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Ok(mut state) = self.state.lock() {
            let pending = Holder::Pending(self.id);
            state.reservations.retain(|_, holder| *holder != pending);
        }
    }
}

#[async_trait]
impl NetworkTransaction for InMemoryNetworkTransaction {
    async fn insert_network(&mut self, network: &Network) -> Result<(), RepositoryError> {
        self.networks.push(network.clone());
        Ok(())
    }

    async fn set_network_mtu(&mut self, id: &NetworkId, mtu: Option<u32>) -> Result<(), RepositoryError> {
        let network = self
            .networks
            .iter_mut()
            .find(|network| network.id() == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("network {id}")))?;
        *network = network.clone().with_mtu(mtu);
        Ok(())
    }

    async fn reserve_segment(&mut self, key: &SegmentKey) -> Result<bool, RepositoryError> {
        let mut state = lock(&self.state)?;
        match state.reservations.entry(key.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(Holder::Pending(self.id));
                Ok(true)
            }
        }
    }

    async fn allocate_segment_id(
        &mut self,
        network_type: &str,
        physical_network: Option<&str>,
        range: SegmentRange,
    ) -> Result<Option<u32>, RepositoryError> {
        let mut state = lock(&self.state)?;
        let taken: HashSet<u32> = state
            .reservations
            .keys()
            .filter(|key| {
                key.network_type == network_type
                    && key.physical_network.as_deref() == physical_network
            })
            .filter_map(|key| key.segment_id)
            .filter(|id| (range.min..=range.max).contains(id))
            .collect();

        // The lowest free id is the range start or directly follows a taken one
        let free = std::iter::once(range.min)
            .chain(taken.iter().filter(|id| **id < range.max).map(|id| id + 1))
            .filter(|candidate| !taken.contains(candidate))
            .min();

        if let Some(segment_id) = free {
            state.reservations.insert(
                SegmentKey::new(network_type, physical_network, Some(segment_id)),
                Holder::Pending(self.id),
            );
        }
        Ok(free)
    }

    async fn add_network_segment(&mut self, segment: &NetworkSegment) -> Result<(), RepositoryError> {
        self.segments.push(segment.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let mut this = self;
        {
            let mut state = lock(&this.state)?;
            let pending = Holder::Pending(this.id);
            for holder in state.reservations.values_mut() {
                if *holder == pending {
                    *holder = Holder::Committed;
                }
            }
            for network in this.networks.drain(..) {
                state.networks.insert(*network.id(), network);
            }
            for segment in this.segments.drain(..) {
                state
                    .segments
                    .entry(segment.network_id)
                    .or_default()
                    .push(segment);
            }
            for segments in state.segments.values_mut() {
                segments.sort_by_key(|segment| segment.segment_index);
            }
        }
        this.committed = true;
        Ok(())
    }
}
