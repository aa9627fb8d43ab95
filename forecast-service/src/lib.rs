//! Forecast service for the weather dashboard.
//!
//! A TTL cache in front of the weatherapi.com forecast endpoint, the dashboard
//! state built on top of it, a periodic refresh loop and the HTTP routes the
//! browser front end calls.

pub mod api_client;
pub mod cache;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod handlers;
pub mod openapi;
pub mod preferences;
pub mod refresh;
pub mod views;
