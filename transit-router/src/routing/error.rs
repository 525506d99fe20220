//! Routing coordinator error types.

use crate::domain::StationId;
use crate::planner::TransportOutOfRange;

/// Errors returned by [`RoutingState`](super::RoutingState) operations.
///
/// None of these leave the session in a changed state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    /// Transport id outside the network
    #[error(transparent)]
    OutOfRange(#[from] TransportOutOfRange),

    /// Station identifier does not name a station of the network
    #[error("unknown station {0}")]
    UnknownStation(StationId),

    /// A route was selected but none is cached
    #[error("no routes available")]
    NoRoutes,

    /// A route was selected by an index past the end of the collection
    #[error("route index {index} out of range ({count} routes)")]
    RouteIndex { index: usize, count: usize },

    /// The operation exists but is not supported
    #[error("{0} not supported")]
    Unsupported(&'static str),
}
