//! Route extraction and ranking.
//!
//! The best route is read straight off the solver's predecessor links.
//! Alternatives come from a restricted k-shortest-paths search: each edge of
//! an accepted route is forbidden in turn and the search rerun, and the
//! fastest new path found is accepted next.

use std::collections::HashSet;

use chrono::Duration;
use tracing::debug;

use super::graph::{EdgeKind, TransitGraph};
use super::solver::{LabelMap, SolveRequest, shortest_times};
use crate::domain::StationId;

/// A path through the network with its timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    stations: Vec<StationId>,
    /// Cumulative time from the origin at each station.
    arrivals: Vec<Duration>,
    transfers: usize,
}

impl Route {
    /// Read the route to `destination` off a label map.
    ///
    /// Returns `None` if the destination was not reached.
    pub fn from_labels(labels: &LabelMap, destination: &StationId) -> Option<Self> {
        let stations = labels.path_to(destination)?;
        let mut arrivals = Vec::with_capacity(stations.len());
        let mut transfers = 0;
        for station in &stations {
            let label = labels.label(station)?;
            arrivals.push(label.time);
            if label.via == Some(EdgeKind::Transfer) {
                transfers += 1;
            }
        }
        Some(Self {
            stations,
            arrivals,
            transfers,
        })
    }

    /// Stations from origin to destination.
    pub fn stations(&self) -> &[StationId] {
        &self.stations
    }

    /// Cumulative time at each station, parallel to [`Route::stations`].
    pub fn arrivals(&self) -> &[Duration] {
        &self.arrivals
    }

    /// Total travel time.
    pub fn total_time(&self) -> Duration {
        self.arrivals.last().copied().unwrap_or_else(Duration::zero)
    }

    /// Number of transfers taken.
    pub fn transfer_count(&self) -> usize {
        self.transfers
    }

    /// First station.
    pub fn origin(&self) -> Option<StationId> {
        self.stations.first().copied()
    }

    /// Last station.
    pub fn destination(&self) -> Option<StationId> {
        self.stations.last().copied()
    }

    /// Returns true if the route passes through the station.
    pub fn contains(&self, station: &StationId) -> bool {
        self.stations.contains(station)
    }

    /// Returns true if any station of the route belongs to the transport.
    pub fn uses_transport(&self, transport: usize) -> bool {
        self.stations.iter().any(|s| s.transport == transport)
    }

    /// Directed edges of the route, in travel order.
    pub fn edges(&self) -> impl Iterator<Item = (StationId, StationId)> + '_ {
        self.stations.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Ranked routes between two stations with a current selection.
///
/// Index 0 is the best route; the rest are alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteCollection {
    routes: Vec<Route>,
    current: usize,
}

impl RouteCollection {
    /// A collection with no routes (destination unreachable).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rank routes into a collection, selecting the best.
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes: rank_routes(routes),
            current: 0,
        }
    }

    /// All routes, best first.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The fastest route.
    pub fn best(&self) -> Option<&Route> {
        self.routes.first()
    }

    /// Routes other than the best.
    pub fn alternatives(&self) -> &[Route] {
        self.routes.get(1..).unwrap_or(&[])
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no route was found.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Index of the selected route.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The selected route.
    pub fn current_route(&self) -> Option<&Route> {
        self.routes.get(self.current)
    }

    /// Select the best route.
    pub fn select_best(&mut self) -> Option<&Route> {
        self.select(0)
    }

    /// Select a route by rank. Leaves the selection unchanged if out of range.
    pub fn select(&mut self, index: usize) -> Option<&Route> {
        if index >= self.routes.len() {
            return None;
        }
        self.current = index;
        self.routes.get(index)
    }
}

/// Rank routes by preference.
///
/// Routes are ranked by:
/// 1. Total time (shorter is better)
/// 2. Number of transfers (fewer is better)
///
/// The sort is stable, so remaining ties keep their discovery order.
pub fn rank_routes(mut routes: Vec<Route>) -> Vec<Route> {
    routes.sort_by(|a, b| {
        a.total_time()
            .cmp(&b.total_time())
            .then_with(|| a.transfer_count().cmp(&b.transfer_count()))
    });
    routes
}

/// Drop routes whose station sequence repeats an earlier route.
pub fn deduplicate(routes: Vec<Route>) -> Vec<Route> {
    let mut seen: HashSet<Vec<StationId>> = HashSet::new();
    routes
        .into_iter()
        .filter(|r| seen.insert(r.stations.clone()))
        .collect()
}

/// Extract the best route and up to `max_alternatives` alternatives.
///
/// `labels` must come from a search over `graph` with the same `blocked`
/// set. Returns an empty collection if the destination is unreachable.
pub fn extract_routes(
    graph: &TransitGraph,
    labels: &LabelMap,
    destination: &StationId,
    blocked: &HashSet<StationId>,
    max_alternatives: usize,
) -> RouteCollection {
    let Some(best) = Route::from_labels(labels, destination) else {
        debug!(source = %labels.source(), %destination, "destination unreachable");
        return RouteCollection::empty();
    };

    let source = labels.source();
    let mut accepted = vec![best];
    let mut candidates: Vec<Route> = Vec::new();
    let mut explored = 0;

    while accepted.len() <= max_alternatives {
        for route in &accepted[explored..] {
            for edge in route.edges() {
                let excluded = HashSet::from([edge]);
                let request = SolveRequest::new(source, blocked).excluding(&excluded);
                let detour = shortest_times(graph, &request);
                let Some(alternative) = Route::from_labels(&detour, destination) else {
                    continue;
                };
                let known = accepted
                    .iter()
                    .chain(candidates.iter())
                    .any(|r| r.stations == alternative.stations);
                if !known {
                    candidates.push(alternative);
                }
            }
        }
        explored = accepted.len();

        let Some(next) = fastest_candidate(&candidates) else {
            break;
        };
        accepted.push(candidates.remove(next));
    }

    debug!(
        %source,
        %destination,
        routes = accepted.len(),
        "routes extracted"
    );
    RouteCollection::new(deduplicate(accepted))
}

/// Index of the fastest candidate; the earliest one wins ties.
fn fastest_candidate(candidates: &[Route]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .min_by(|(i, a), (j, b)| {
            a.total_time()
                .cmp(&b.total_time())
                .then_with(|| a.transfer_count().cmp(&b.transfer_count()))
                .then_with(|| i.cmp(j))
        })
        .map(|(i, _)| i)
}
