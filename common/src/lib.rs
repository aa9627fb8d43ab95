//! Types shared by the dashboard services: errors, the weather API models,
//! the outbound HTTP client and tracing setup.

pub mod errors;
pub mod http_client;
pub mod models;
pub mod tracing;
