//! Routing session coordinator.
//!
//! [`RoutingState`] owns the user's selections and a background worker that
//! rebuilds the transit graph, computes travel times and extracts routes.
//! Results reach the UI through [`RoutingListener`]s.

mod blocked;
mod error;
mod listener;
mod state;
mod worker;

pub use blocked::BlockedStations;
pub use error::RoutingError;
pub use listener::{ListenerId, RoutingListener};
pub use state::RoutingState;
