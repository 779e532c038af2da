//! Driving Adapters
//!
//! Entry points that drive the application:
//! - HTTP REST API handlers
//! - DTOs for request/response

pub mod api_rest;
