//! Infrastructure Layer
//!
//! Contains all external concerns: driving adapters (HTTP handlers) and
//! driven adapters (repositories, external services).

pub mod driven_adapters;
pub mod driving_adapters;
