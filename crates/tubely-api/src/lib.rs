//! Tubely API library
//!
//! Exposes setup, state and routing so the binary and the integration tests
//! build the same application.

pub mod auth;
pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;
mod telemetry;
mod utils;
