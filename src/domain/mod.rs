//! Domain Layer
//!
//! Contains the core business concepts, domain models, and gateway traits (ports).
//! This layer has no dependencies on infrastructure.

pub mod gateways;
pub mod models;

pub use gateways::{NetworkStore, NetworkTransaction, TypeDriver};
pub use models::network::{CreateNetworkData, ExternalAttribute, Network, NetworkId, NetworkRequest, NetworkView};
pub use models::segment::{NetworkSegment, SegmentKey, SegmentRange, SegmentSpec};
