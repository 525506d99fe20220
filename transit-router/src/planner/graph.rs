//! Transit graph built from the active part of the network.
//!
//! Nodes are stations of active transports. Edges are line hops (both
//! directions) and transfers whose two ends are both active. Edges with an
//! unknown time stay in the adjacency lists so topology is never lost, but
//! the solver never relaxes them.

use std::collections::{BTreeSet, HashMap};

use crate::domain::{Network, StationId, TravelTime};

/// Error returned when a transport id is outside the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid transport index {id} (network has {count} transports)")]
pub struct TransportOutOfRange {
    pub id: usize,
    pub count: usize,
}

/// The set of transports currently eligible for routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTransports {
    ids: BTreeSet<usize>,
    count: usize,
}

impl ActiveTransports {
    /// An empty set for a network with `count` transports.
    pub fn none(count: usize) -> Self {
        Self {
            ids: BTreeSet::new(),
            count,
        }
    }

    /// Every transport of a network with `count` transports.
    pub fn all(count: usize) -> Self {
        Self {
            ids: (0..count).collect(),
            count,
        }
    }

    /// Build a set from ids, failing on the first id out of range.
    pub fn from_ids(
        ids: impl IntoIterator<Item = usize>,
        count: usize,
    ) -> Result<Self, TransportOutOfRange> {
        let mut set = Self::none(count);
        for id in ids {
            set.insert(id)?;
        }
        Ok(set)
    }

    fn check(&self, id: usize) -> Result<(), TransportOutOfRange> {
        if id >= self.count {
            return Err(TransportOutOfRange {
                id,
                count: self.count,
            });
        }
        Ok(())
    }

    /// Add a transport. Returns whether the set changed.
    pub fn insert(&mut self, id: usize) -> Result<bool, TransportOutOfRange> {
        self.check(id)?;
        Ok(self.ids.insert(id))
    }

    /// Remove a transport. Returns whether the set changed.
    pub fn remove(&mut self, id: usize) -> Result<bool, TransportOutOfRange> {
        self.check(id)?;
        Ok(self.ids.remove(&id))
    }

    /// Returns true if the transport is active. Out-of-range ids are never active.
    pub fn contains(&self, id: usize) -> bool {
        self.ids.contains(&id)
    }

    /// Active ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.ids.iter().copied()
    }

    /// Number of transports in the network this set belongs to.
    pub fn capacity(&self) -> usize {
        self.count
    }

    /// Returns true if no transport is active.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The same set for a network with `count` transports, dropping ids
    /// that no longer exist.
    pub fn resized(&self, count: usize) -> Self {
        Self {
            ids: self.ids.range(..count).copied().collect(),
            count,
        }
    }
}

/// How an edge was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Riding between consecutive stations of a line.
    Hop,
    /// Changing between two stations.
    Transfer,
}

/// A directed edge of the transit graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub to: StationId,
    /// `None` when the data did not give a time; such edges are not traversable.
    pub time: TravelTime,
    pub kind: EdgeKind,
}

/// Weighted directed multigraph over active stations.
#[derive(Debug, Clone, Default)]
pub struct TransitGraph {
    adjacency: HashMap<StationId, Vec<Edge>>,
    edge_count: usize,
}

impl TransitGraph {
    /// Build the graph for the active transports of a network.
    ///
    /// Deterministic: identical inputs give identical adjacency lists.
    pub fn build(active: &ActiveTransports, network: &Network) -> Self {
        let mut graph = Self::default();

        for (t, transport) in network.transports().iter().enumerate() {
            if !active.contains(t) {
                continue;
            }
            for (l, line) in transport.lines.iter().enumerate() {
                for s in 0..line.len() {
                    graph.adjacency.entry(StationId::new(t, l, s)).or_default();
                }
                for (from, to, time) in line.hops() {
                    let from = StationId::new(t, l, from);
                    let to = StationId::new(t, l, to);
                    graph.add_both_ways(from, to, time, EdgeKind::Hop);
                }
            }
        }

        for transport in network.transports() {
            for transfer in &transport.transfers {
                if transfer.from == transfer.to
                    || !graph.contains(&transfer.from)
                    || !graph.contains(&transfer.to)
                {
                    continue;
                }
                graph.add_both_ways(transfer.from, transfer.to, transfer.time, EdgeKind::Transfer);
            }
        }

        graph
    }

    fn add_both_ways(&mut self, a: StationId, b: StationId, time: TravelTime, kind: EdgeKind) {
        self.adjacency
            .entry(a)
            .or_default()
            .push(Edge { to: b, time, kind });
        self.adjacency
            .entry(b)
            .or_default()
            .push(Edge { to: a, time, kind });
        self.edge_count += 2;
    }

    /// Returns true if the station is a node of the graph.
    pub fn contains(&self, station: &StationId) -> bool {
        self.adjacency.contains_key(station)
    }

    /// All outgoing edges of a station, including ones with unknown time.
    pub fn edges_from(&self, station: &StationId) -> &[Edge] {
        self.adjacency
            .get(station)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &StationId> + '_ {
        self.adjacency.keys()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}
