//! HTTP Handlers

pub mod networks;
