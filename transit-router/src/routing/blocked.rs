//! Blocked station set.

use std::collections::HashSet;

use crate::domain::StationId;

/// Stations excluded from routing, in the order they were blocked.
///
/// Membership is by value, so identifiers built independently still match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockedStations {
    order: Vec<StationId>,
    members: HashSet<StationId>,
}

impl BlockedStations {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Block a station. Returns false if it was already blocked.
    pub fn insert(&mut self, station: StationId) -> bool {
        if !self.members.insert(station) {
            return false;
        }
        self.order.push(station);
        true
    }

    /// Unblock a station. Returns false if it was not blocked.
    pub fn remove(&mut self, station: &StationId) -> bool {
        if !self.members.remove(station) {
            return false;
        }
        self.order.retain(|s| s != station);
        true
    }

    /// Returns true if the station is blocked.
    pub fn contains(&self, station: &StationId) -> bool {
        self.members.contains(station)
    }

    /// Blocked stations in blocking order.
    pub fn as_slice(&self) -> &[StationId] {
        &self.order
    }

    /// Blocked stations as a set, for searches.
    pub fn as_set(&self) -> &HashSet<StationId> {
        &self.members
    }

    /// Keep only stations matching the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&StationId) -> bool) {
        self.order.retain(|s| keep(s));
        let order = &self.order;
        self.members.retain(|s| order.contains(s));
    }

    /// Number of blocked stations.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing is blocked.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: usize) -> StationId {
        StationId::new(0, 0, s)
    }

    #[test]
    fn insert_ignores_duplicates() {
        let mut blocked = BlockedStations::new();
        assert!(blocked.insert(id(1)));
        assert!(blocked.insert(id(2)));
        assert!(!blocked.insert(StationId::new(0, 0, 1)));
        assert_eq!(blocked.as_slice(), &[id(1), id(2)]);
        assert_eq!(blocked.len(), 2);
    }

    #[test]
    fn remove_matches_by_value() {
        let mut blocked = BlockedStations::new();
        blocked.insert(id(1));
        blocked.insert(id(2));
        blocked.insert(id(3));

        assert!(blocked.remove(&StationId::new(0, 0, 2)));
        assert!(!blocked.remove(&id(2)));
        assert_eq!(blocked.as_slice(), &[id(1), id(3)]);
        assert!(!blocked.contains(&id(2)));
        assert!(blocked.contains(&id(3)));
    }

    #[test]
    fn retain_keeps_order_and_set_in_sync() {
        let mut blocked = BlockedStations::new();
        for s in 0..5 {
            blocked.insert(id(s));
        }
        blocked.retain(|s| s.station % 2 == 0);

        assert_eq!(blocked.as_slice(), &[id(0), id(2), id(4)]);
        assert_eq!(blocked.as_set().len(), 3);
        assert!(!blocked.contains(&id(1)));
    }
}
