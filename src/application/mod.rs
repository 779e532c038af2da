//! Application Layer
//!
//! Contains segment orchestration and the use cases built on it.
//! Both depend on domain gateways (abstractions), not concrete implementations.

pub mod segments;
pub mod use_cases;
