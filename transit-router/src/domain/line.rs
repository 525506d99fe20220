//! Lines, transfers and the immutable network they form.

use super::error::DomainError;
use super::station::StationId;
use super::time::TravelTime;

fn is_negative(time: &TravelTime) -> bool {
    time.is_some_and(|t| t < chrono::Duration::zero())
}

/// An ordered sequence of stations with a travel time per hop.
///
/// Hops can be travelled in both directions in the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    name: String,
    stations: Vec<String>,
    times: Vec<TravelTime>,
}

impl Line {
    /// Create a line, checking there is exactly one time per consecutive pair
    /// and that no known time is negative.
    pub fn new(
        name: impl Into<String>,
        stations: Vec<String>,
        times: Vec<TravelTime>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if stations.is_empty() {
            return Err(DomainError::EmptyLine(name));
        }
        if times.len() != stations.len() - 1 {
            return Err(DomainError::TimeCountMismatch {
                line: name,
                stations: stations.len(),
                times: times.len(),
            });
        }
        if let Some(hop) = times.iter().position(is_negative) {
            return Err(DomainError::NegativeHopTime { line: name, hop });
        }
        Ok(Self {
            name,
            stations,
            times,
        })
    }

    /// The line's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Station names in line order.
    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    /// Number of stations on the line.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Lines always hold at least one station.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Travel time between station `i` and station `i + 1`.
    pub fn hop_time(&self, i: usize) -> TravelTime {
        self.times.get(i).copied().flatten()
    }

    /// Iterate over hops as `(from_position, to_position, time)`.
    pub fn hops(&self) -> impl Iterator<Item = (usize, usize, TravelTime)> + '_ {
        self.times.iter().enumerate().map(|(i, t)| (i, i + 1, *t))
    }
}

/// A fixed-time connection between two stations, usable in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub from: StationId,
    pub to: StationId,
    pub time: TravelTime,
}

impl Transfer {
    /// Create a new transfer.
    pub fn new(from: StationId, to: StationId, time: TravelTime) -> Self {
        Self { from, to, time }
    }

    /// Returns the other end of the transfer, if `station` is one end.
    pub fn other_end(&self, station: &StationId) -> Option<StationId> {
        if &self.from == station {
            Some(self.to)
        } else if &self.to == station {
            Some(self.from)
        } else {
            None
        }
    }
}

/// One transport (e.g. a metro or tram system): its lines and transfers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    pub name: String,
    /// Network type reported by the data source (e.g. "Metro").
    pub kind: String,
    pub lines: Vec<Line>,
    pub transfers: Vec<Transfer>,
}

impl Transport {
    /// Create a new transport.
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        lines: Vec<Line>,
        transfers: Vec<Transfer>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            lines,
            transfers,
        }
    }
}

/// The whole transit network: every loaded transport, in load order.
///
/// Immutable once built; shared between the coordinator and its worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Network {
    transports: Vec<Transport>,
}

impl Network {
    /// Build a network, checking every transfer endpoint exists and no
    /// transfer time is negative.
    pub fn new(transports: Vec<Transport>) -> Result<Self, DomainError> {
        let network = Self { transports };
        for transport in &network.transports {
            for transfer in &transport.transfers {
                for end in [transfer.from, transfer.to] {
                    if !network.contains(&end) {
                        return Err(DomainError::UnknownTransferStation(end));
                    }
                }
                if is_negative(&transfer.time) {
                    return Err(DomainError::NegativeTransferTime {
                        from: transfer.from,
                        to: transfer.to,
                    });
                }
            }
        }
        Ok(network)
    }

    /// All transports in load order.
    pub fn transports(&self) -> &[Transport] {
        &self.transports
    }

    /// Number of transports; valid transport ids are `0..transport_count()`.
    pub fn transport_count(&self) -> usize {
        self.transports.len()
    }

    /// Look up a line.
    pub fn line(&self, transport: usize, line: usize) -> Option<&Line> {
        self.transports.get(transport)?.lines.get(line)
    }

    /// Returns true if the identifier names a real station.
    pub fn contains(&self, station: &StationId) -> bool {
        self.line(station.transport, station.line)
            .is_some_and(|line| station.station < line.len())
    }

    /// Display name of a station.
    pub fn station_name(&self, station: &StationId) -> Option<&str> {
        self.line(station.transport, station.line)?
            .stations()
            .get(station.station)
            .map(String::as_str)
    }

    /// Total number of stations across all lines.
    pub fn station_count(&self) -> usize {
        self.transports
            .iter()
            .flat_map(|t| t.lines.iter())
            .map(Line::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn mins(m: i64) -> TravelTime {
        Some(Duration::minutes(m))
    }

    fn sample() -> Network {
        let a = Line::new("A", names(&["A1", "A2", "A3"]), vec![mins(5), mins(7)]).unwrap();
        let b = Line::new("B", names(&["B1", "B2"]), vec![mins(4)]).unwrap();
        let transfer = Transfer::new(StationId::new(0, 0, 1), StationId::new(0, 1, 0), mins(3));
        Network::new(vec![Transport::new("Metro", "Metro", vec![a, b], vec![transfer])]).unwrap()
    }

    #[test]
    fn line_rejects_bad_time_count() {
        let err = Line::new("A", names(&["A1", "A2"]), vec![]).unwrap_err();
        assert_eq!(
            err,
            DomainError::TimeCountMismatch {
                line: "A".into(),
                stations: 2,
                times: 0
            }
        );
    }

    #[test]
    fn negative_times_are_rejected() {
        let err = Line::new("A", names(&["A1", "A2", "A3"]), vec![mins(5), mins(-2)]).unwrap_err();
        assert_eq!(
            err,
            DomainError::NegativeHopTime {
                line: "A".into(),
                hop: 1
            }
        );

        let a = Line::new("A", names(&["A1", "A2"]), vec![None]).unwrap();
        let b = Line::new("B", names(&["B1", "B2"]), vec![mins(0)]).unwrap();
        let from = StationId::new(0, 0, 1);
        let to = StationId::new(0, 1, 0);
        let transfer = Transfer::new(from, to, mins(-10));
        let err = Network::new(vec![Transport::new("Metro", "Metro", vec![a, b], vec![transfer])])
            .unwrap_err();
        assert_eq!(err, DomainError::NegativeTransferTime { from, to });
    }

    #[test]
    fn line_rejects_empty() {
        assert_eq!(
            Line::new("A", vec![], vec![]).unwrap_err(),
            DomainError::EmptyLine("A".into())
        );
    }

    #[test]
    fn single_station_line_has_no_hops() {
        let line = Line::new("Stub", names(&["S"]), vec![]).unwrap();
        assert_eq!(line.hops().count(), 0);
        assert_eq!(line.hop_time(0), None);
    }

    #[test]
    fn hops_enumerate_pairs() {
        let line = Line::new("A", names(&["A1", "A2", "A3"]), vec![mins(5), None]).unwrap();
        let hops: Vec<_> = line.hops().collect();
        assert_eq!(hops, vec![(0, 1, mins(5)), (1, 2, None)]);
    }

    #[test]
    fn transfer_other_end() {
        let t = Transfer::new(StationId::new(0, 0, 1), StationId::new(0, 1, 0), mins(3));
        assert_eq!(t.other_end(&StationId::new(0, 0, 1)), Some(StationId::new(0, 1, 0)));
        assert_eq!(t.other_end(&StationId::new(0, 1, 0)), Some(StationId::new(0, 0, 1)));
        assert_eq!(t.other_end(&StationId::new(0, 0, 0)), None);
    }

    #[test]
    fn network_lookups() {
        let net = sample();
        assert_eq!(net.transport_count(), 1);
        assert_eq!(net.station_count(), 5);
        assert!(net.contains(&StationId::new(0, 0, 2)));
        assert!(!net.contains(&StationId::new(0, 0, 3)));
        assert!(!net.contains(&StationId::new(0, 2, 0)));
        assert!(!net.contains(&StationId::new(1, 0, 0)));
        assert_eq!(net.station_name(&StationId::new(0, 1, 1)), Some("B2"));
    }

    #[test]
    fn network_rejects_dangling_transfer() {
        let a = Line::new("A", names(&["A1"]), vec![]).unwrap();
        let bad = Transfer::new(StationId::new(0, 0, 0), StationId::new(3, 0, 0), mins(1));
        let err = Network::new(vec![Transport::new("T", "Metro", vec![a], vec![bad])]).unwrap_err();
        assert_eq!(err, DomainError::UnknownTransferStation(StationId::new(3, 0, 0)));
    }
}
