//! Driven Adapters
//!
//! Implementations of gateway traits for external systems:
//! - Network stores (PostgreSQL, in-memory)
//! - Segment type drivers
//! - Configuration

pub mod config;
pub mod database;
pub mod network_store;
pub mod type_drivers;

pub use config::AppConfig;
pub use network_store::{InMemoryNetworkStore, PostgresNetworkStore};
pub use type_drivers::BuiltinDrivers;
