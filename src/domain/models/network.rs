//! Network Domain Model
//!
//! Represents a tenant network and its outward, segment-extended view.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::segment::SegmentSpec;

/// Newtype wrapper for Network ID providing type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkId(Uuid);

impl NetworkId {
    /// Create a new random NetworkId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a NetworkId from an existing UUID
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NetworkId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for NetworkId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl TryFrom<&str> for NetworkId {
    type Error = uuid::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(Self(Uuid::parse_str(value)?))
    }
}

/// Anything carrying the (possibly unset) external attribute of a network
pub trait ExternalAttribute {
    /// `None` when the caller never set the attribute
    fn external_attr(&self) -> Option<bool>;
}

/// Data required to create a new Network
#[derive(Debug, Clone)]
pub struct CreateNetworkData {
    pub name: String,
    pub tenant_id: String,
    pub external: Option<bool>,
    /// Caller-declared provider segments, in request order
    pub segments: Vec<SegmentSpec>,
}

/// A network as seen by the segment allocator: identity, external flag and
/// the provider segments the caller asked for
#[derive(Debug, Clone)]
pub struct NetworkRequest {
    pub id: NetworkId,
    pub external: Option<bool>,
    pub segments: Vec<SegmentSpec>,
}

impl NetworkRequest {
    #[must_use]
    pub fn new(network: &Network, segments: Vec<SegmentSpec>) -> Self {
        Self {
            id: *network.id(),
            external: network.external(),
            segments,
        }
    }
}

impl ExternalAttribute for NetworkRequest {
    fn external_attr(&self) -> Option<bool> {
        self.external
    }
}

/// Network domain entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    id: NetworkId,
    tenant_id: String,
    name: String,
    external: Option<bool>,
    mtu: Option<u32>,
    created_at: DateTime<Utc>,
}

impl Network {
    /// Create a new Network from creation data
    #[must_use]
    pub fn new(data: &CreateNetworkData) -> Self {
        Self {
            id: NetworkId::new(),
            tenant_id: data.tenant_id.clone(),
            name: data.name.clone(),
            external: data.external,
            mtu: None,
            created_at: Utc::now(),
        }
    }

    /// Restore a Network from persisted data
    #[must_use]
    pub fn restore(
        id: NetworkId,
        tenant_id: String,
        name: String,
        external: Option<bool>,
        mtu: Option<u32>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            name,
            external,
            mtu,
            created_at,
        }
    }

    /// Return the network with its aggregate segment MTU set
    #[must_use]
    pub fn with_mtu(self, mtu: Option<u32>) -> Self {
        Self { mtu, ..self }
    }

    // Getters

    #[must_use]
    pub fn id(&self) -> &NetworkId {
        &self.id
    }

    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn external(&self) -> Option<bool> {
        self.external
    }

    #[must_use]
    pub fn mtu(&self) -> Option<u32> {
        self.mtu
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ExternalAttribute for Network {
    fn external_attr(&self) -> Option<bool> {
        self.external
    }
}

/// Outward representation of a network, optionally carrying provider
/// attributes projected from its persisted segments.
///
/// A single segment is exposed through `provider`; several segments are
/// exposed through `segments` and leave `provider` unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkView {
    pub network: Network,
    pub provider: Option<SegmentSpec>,
    pub segments: Vec<SegmentSpec>,
}

impl From<Network> for NetworkView {
    fn from(network: Network) -> Self {
        Self {
            network,
            provider: None,
            segments: Vec::new(),
        }
    }
}

impl ExternalAttribute for NetworkView {
    fn external_attr(&self) -> Option<bool> {
        self.network.external()
    }
}
