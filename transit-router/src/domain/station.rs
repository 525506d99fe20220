//! Station identifier types.

use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// A station on one line of one transport.
///
/// Stations are identified by position, not by name: the same physical
/// interchange appears once per line and is joined to its siblings by
/// transfers. Equality and hashing are structural, so two independently
/// built identifiers for the same position compare equal.
///
/// # Examples
///
/// ```
/// use transit_router::domain::StationId;
///
/// let a = StationId::new(0, 1, 4);
/// let b: StationId = "0/1/4".parse().unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "0/1/4");
///
/// assert!("0/1".parse::<StationId>().is_err());
/// assert!("a/b/c".parse::<StationId>().is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId {
    /// Index of the transport in the network.
    pub transport: usize,
    /// Index of the line within the transport.
    pub line: usize,
    /// Position of the station along the line.
    pub station: usize,
}

impl StationId {
    /// Create a station identifier from its three indices.
    pub const fn new(transport: usize, line: usize, station: usize) -> Self {
        Self {
            transport,
            line,
            station,
        }
    }

    /// Returns true if both stations sit on the same line of the same transport.
    pub fn same_line(&self, other: &StationId) -> bool {
        self.transport == other.transport && self.line == other.line
    }
}

impl FromStr for StationId {
    type Err = InvalidStationId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('/');
        let mut next = || -> Result<usize, InvalidStationId> {
            let part = parts.next().ok_or(InvalidStationId {
                reason: "expected transport/line/station",
            })?;
            part.parse().map_err(|_| InvalidStationId {
                reason: "indices must be non-negative integers",
            })
        };

        let transport = next()?;
        let line = next()?;
        let station = next()?;

        if parts.next().is_some() {
            return Err(InvalidStationId {
                reason: "expected transport/line/station",
            });
        }

        Ok(Self::new(transport, line, station))
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({self})")
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.transport, self.line, self.station)
    }
}
