//! Domain Models
//!
//! Pure domain entities and value objects representing business concepts.

pub mod network;
pub mod segment;

pub use network::{CreateNetworkData, ExternalAttribute, Network, NetworkId, NetworkRequest, NetworkView};
pub use segment::{NetworkSegment, SegmentKey, SegmentRange, SegmentSpec};
