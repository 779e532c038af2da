//! Segment Management
//!
//! Type driver registry, external network classification, segment
//! allocation and provider attribute projection.

pub mod allocator;
pub mod classifier;
pub mod extender;
pub mod registry;

pub use allocator::SegmentAllocator;
pub use classifier::is_external;
pub use extender::NetworkDictExtender;
pub use registry::TypeDriverRegistry;
