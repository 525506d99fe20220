//! Single-source shortest-time search.
//!
//! Classic label-setting search (Dijkstra) over the transit graph. The search
//! has no target: it settles every station reachable from the source so the
//! destination can change without a new computation. Newly settled stations
//! are reported in batches while the search runs.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use chrono::Duration;
use tracing::{debug, trace};

use super::graph::{EdgeKind, TransitGraph};
use crate::domain::StationId;

/// Best known arrival at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    /// Cumulative travel time from the source.
    pub time: Duration,
    /// Previous station on the best path; `None` for the source.
    pub predecessor: Option<StationId>,
    /// Kind of edge used to arrive; `None` for the source.
    pub via: Option<EdgeKind>,
}

/// Result of a search: a label per reachable station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    source: StationId,
    labels: HashMap<StationId, Label>,
    settle_order: Vec<StationId>,
}

impl LabelMap {
    fn empty(source: StationId) -> Self {
        Self {
            source,
            labels: HashMap::new(),
            settle_order: Vec::new(),
        }
    }

    /// The station the search started from.
    pub fn source(&self) -> StationId {
        self.source
    }

    /// Label of a station, if it is reachable.
    pub fn label(&self, station: &StationId) -> Option<&Label> {
        self.labels.get(station)
    }

    /// Minimal travel time to a station, if it is reachable.
    pub fn time_to(&self, station: &StationId) -> Option<Duration> {
        self.labels.get(station).map(|l| l.time)
    }

    /// Returns true if the station was reached.
    pub fn is_reachable(&self, station: &StationId) -> bool {
        self.labels.contains_key(station)
    }

    /// Stations in the order they were settled (non-decreasing time).
    pub fn settle_order(&self) -> &[StationId] {
        &self.settle_order
    }

    /// Number of reachable stations.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if nothing was reached (not even the source).
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Reconstruct the best path from the source to `destination`.
    pub fn path_to(&self, destination: &StationId) -> Option<Vec<StationId>> {
        let mut path = vec![*destination];
        let mut label = self.labels.get(destination)?;
        while let Some(prev) = label.predecessor {
            path.push(prev);
            label = self.labels.get(&prev)?;
        }
        path.reverse();
        Some(path)
    }
}

/// A batch of newly settled stations with their times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressBatch {
    pub stations: Vec<StationId>,
    pub times: Vec<Duration>,
}

impl ProgressBatch {
    fn push(&mut self, station: StationId, time: Duration) {
        self.stations.push(station);
        self.times.push(time);
    }

    /// Number of stations in the batch.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Returns true if the batch holds no stations.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

/// Parameters for a search, bundled for cleaner function signatures.
#[derive(Debug, Clone, Copy)]
pub struct SolveRequest<'a> {
    pub source: StationId,
    /// Stations that may not be entered or left.
    pub blocked: &'a HashSet<StationId>,
    /// Directed edges `(from, to)` that may not be used.
    pub excluded_edges: Option<&'a HashSet<(StationId, StationId)>>,
}

impl<'a> SolveRequest<'a> {
    /// Create a request with no excluded edges.
    pub fn new(source: StationId, blocked: &'a HashSet<StationId>) -> Self {
        Self {
            source,
            blocked,
            excluded_edges: None,
        }
    }

    /// Forbid the given directed edges.
    pub fn excluding(mut self, edges: &'a HashSet<(StationId, StationId)>) -> Self {
        self.excluded_edges = Some(edges);
        self
    }
}

/// Compute minimal travel times from the source to every reachable station.
///
/// `on_progress` receives batches of at most `batch_size` newly settled
/// stations, in settle order; the final partial batch is flushed before
/// returning. A blocked source, or one outside the graph, reaches nothing.
///
/// Ties are broken by discovery order, so repeated searches over the same
/// input produce identical labels.
pub fn compute_times(
    graph: &TransitGraph,
    request: &SolveRequest<'_>,
    batch_size: usize,
    mut on_progress: impl FnMut(ProgressBatch),
) -> LabelMap {
    let source = request.source;
    let mut result = LabelMap::empty(source);

    if !graph.contains(&source) || request.blocked.contains(&source) {
        debug!(%source, "source not routable, nothing reachable");
        return result;
    }

    let batch_size = batch_size.max(1);
    let mut batch = ProgressBatch::default();
    let mut settled: HashSet<StationId> = HashSet::new();

    // Min-heap on (time, discovery sequence)
    let mut heap: BinaryHeap<Reverse<(Duration, u64, StationId)>> = BinaryHeap::new();
    let mut sequence = 0u64;

    result.labels.insert(
        source,
        Label {
            time: Duration::zero(),
            predecessor: None,
            via: None,
        },
    );
    heap.push(Reverse((Duration::zero(), sequence, source)));

    while let Some(Reverse((time, _, station))) = heap.pop() {
        if !settled.insert(station) {
            continue;
        }

        result.settle_order.push(station);
        batch.push(station, time);
        if batch.len() >= batch_size {
            on_progress(std::mem::take(&mut batch));
        }

        for edge in graph.edges_from(&station) {
            let Some(edge_time) = edge.time else {
                continue;
            };
            if settled.contains(&edge.to)
                || request.blocked.contains(&edge.to)
                || request
                    .excluded_edges
                    .is_some_and(|excluded| excluded.contains(&(station, edge.to)))
            {
                continue;
            }

            let candidate = time + edge_time;
            let improves = result
                .labels
                .get(&edge.to)
                .is_none_or(|existing| candidate < existing.time);
            if !improves {
                continue;
            }

            trace!(from = %station, to = %edge.to, ?candidate, "relaxed");
            result.labels.insert(
                edge.to,
                Label {
                    time: candidate,
                    predecessor: Some(station),
                    via: Some(edge.kind),
                },
            );
            sequence += 1;
            heap.push(Reverse((candidate, sequence, edge.to)));
        }
    }

    if !batch.is_empty() {
        on_progress(batch);
    }

    debug!(%source, reachable = result.len(), "times computed");
    result
}

/// Compute times without progress reporting.
pub fn shortest_times(graph: &TransitGraph, request: &SolveRequest<'_>) -> LabelMap {
    compute_times(graph, request, usize::MAX, |_| {})
}
