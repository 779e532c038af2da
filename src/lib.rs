//! Network Segment Registry API
//!
//! Service that creates tenant networks and binds each one to its transport
//! segments (flat, VLAN, VXLAN or local) through pluggable type drivers,
//! following Clean/Hexagonal Architecture principles.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
