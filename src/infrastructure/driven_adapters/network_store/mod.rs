//! Network Store Implementations

pub mod memory;
pub mod postgres;

pub use memory::InMemoryNetworkStore;
pub use postgres::PostgresNetworkStore;
