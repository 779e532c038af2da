//! Network Use Cases
//!
//! Network creation with segment allocation, and segment-extended reads.

mod create_network;
mod get_network_by_id;
mod list_networks;

pub use create_network::CreateNetworkUseCase;
pub use get_network_by_id::GetNetworkByIdUseCase;
pub use list_networks::ListNetworksUseCase;
