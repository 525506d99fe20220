//! Route planner over the transit graph.
//!
//! This module implements the routing engine: building the graph of active
//! transports, computing shortest travel times from an origin, and
//! extracting the best route plus ranked alternatives to a destination.

mod config;
mod graph;
mod rank;
mod solver;

pub use config::RoutingConfig;
pub use graph::{ActiveTransports, Edge, EdgeKind, TransitGraph, TransportOutOfRange};
pub use rank::{Route, RouteCollection, deduplicate, extract_routes, rank_routes};
pub use solver::{Label, LabelMap, ProgressBatch, SolveRequest, compute_times, shortest_times};
