//! Domain types for the transit router.
//!
//! This module contains the immutable network model: station identifiers,
//! travel times, lines, transfers and transports. All types enforce their
//! invariants at construction time, so code that receives these types can
//! trust their validity.

mod error;
mod line;
mod station;
mod time;

pub use error::DomainError;
pub use line::{Line, Network, Transfer, Transport};
pub use station::{InvalidStationId, StationId};
pub use time::{TimeError, TravelTime, format_duration, parse_travel_time};
