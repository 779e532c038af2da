//! Gateway Traits (Ports)
//!
//! Abstract interfaces defining contracts for external dependencies.
//! These are implemented by driven adapters in the infrastructure layer.

pub mod network_store;
pub mod type_driver;

pub use network_store::{NetworkStore, NetworkTransaction};
pub use type_driver::TypeDriver;
