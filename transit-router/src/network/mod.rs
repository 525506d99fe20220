//! Network data loading.
//!
//! Reads transports (lines, transfers and network type) from JSON files and
//! assembles them into an immutable [`Network`](crate::domain::Network).
//! Malformed travel times are not fatal: they are logged and loaded as
//! unknown.

mod error;
mod source;

pub use error::LoadError;
pub use source::{JsonNetworkSource, NetworkSource, TransportDto};
