//! Core of the CRM reply relay: turns an inbound CRM message event into a
//! drafted reply and hands it to an email backend.
//!
//! The HTTP surface lives in the `http-server` crate; everything here is
//! transport-agnostic apart from the outbound provider clients.

pub mod config;
pub mod models;
pub mod providers;
pub mod services;

pub use config::{ConfigError, RelayConfig};
pub use services::error::RelayError;
pub use services::pipeline::{Relay, RelayOutcome};
