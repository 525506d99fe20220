//! JSON network source.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use super::error::LoadError;
use crate::domain::{
    DomainError, Line, Network, StationId, Transfer, Transport, TravelTime, parse_travel_time,
};

/// A named source of transport data.
///
/// This abstraction allows the router to be fed from files in production
/// and from in-memory fixtures in tests.
pub trait NetworkSource {
    /// Load a single transport by name.
    fn load(&self, name: &str) -> Result<Transport, LoadError>;

    /// Load several transports, in order, into one network.
    ///
    /// Transport ids are assigned by position in `names`.
    fn load_network(&self, names: &[&str]) -> Result<Network, LoadError> {
        if names.is_empty() {
            return Err(LoadError::Empty);
        }
        let transports = names
            .iter()
            .map(|name| self.load(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Network::new(transports)?)
    }
}

/// A travel time as written in a network file.
///
/// Either a string in "M" / "M.S" form or a bare number of minutes. Any
/// other JSON value is kept so the loader can report it instead of failing
/// the whole file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TimeDto {
    Minutes(u32),
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

/// One line as written in a network file.
#[derive(Debug, Clone, Deserialize)]
pub struct LineDto {
    pub name: String,
    pub stations: Vec<String>,
    #[serde(default)]
    pub times: Vec<TimeDto>,
}

/// One transfer as written in a network file; endpoints are
/// `[transport, line, station]` triples.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferDto {
    pub from: [usize; 3],
    pub to: [usize; 3],
    #[serde(default)]
    pub time: Option<TimeDto>,
}

/// A transport file.
#[derive(Debug, Clone, Deserialize)]
pub struct TransportDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    pub lines: Vec<LineDto>,
    #[serde(default)]
    pub transfers: Vec<TransferDto>,
}

impl TransportDto {
    /// Convert to a domain transport.
    ///
    /// `source_name` is used for diagnostics and as the fallback name and
    /// type (its file stem) when the file does not give them.
    pub fn into_transport(self, source_name: &str) -> Result<Transport, DomainError> {
        let stem = Path::new(source_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(source_name)
            .to_string();

        let mut lines = Vec::with_capacity(self.lines.len());
        for line in self.lines {
            let expected = line.stations.len().saturating_sub(1);
            let mut times: Vec<TravelTime> = line
                .times
                .iter()
                .map(|t| normalize_time(t, source_name, &line.name))
                .collect();

            if times.len() != expected && !line.stations.is_empty() {
                warn!(
                    source = source_name,
                    line = %line.name,
                    expected,
                    found = times.len(),
                    "travel time count does not match stations, treating missing times as unknown"
                );
                times.resize(expected, None);
            }

            lines.push(Line::new(line.name, line.stations, times)?);
        }

        let transfers = self
            .transfers
            .iter()
            .map(|t| {
                let [ft, fl, fs] = t.from;
                let [tt, tl, ts] = t.to;
                let time = t
                    .time
                    .as_ref()
                    .and_then(|time| normalize_time(time, source_name, "transfers"));
                Transfer::new(StationId::new(ft, fl, fs), StationId::new(tt, tl, ts), time)
            })
            .collect();

        let name = self.name.unwrap_or_else(|| stem.clone());
        let kind = self.kind.unwrap_or(stem);

        Ok(Transport::new(name, kind, lines, transfers))
    }
}

/// Parse a travel time, downgrading malformed values to unknown.
fn normalize_time(time: &TimeDto, source_name: &str, context: &str) -> TravelTime {
    match time {
        TimeDto::Minutes(m) => Some(chrono::Duration::minutes(i64::from(*m))),
        // Whole non-negative floats such as `4.0`; anything else, including
        // the `-1` "unknown" marker, is not a usable time.
        TimeDto::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= f64::from(u32::MAX) => {
            Some(chrono::Duration::minutes(*n as i64))
        }
        TimeDto::Number(n) => {
            warn!(
                source = source_name,
                context,
                value = *n,
                "travel time is not a whole number of minutes"
            );
            None
        }
        TimeDto::Other(value) => {
            warn!(source = source_name, context, %value, "travel time has an unexpected type");
            None
        }
        TimeDto::Text(text) => match parse_travel_time(text) {
            Ok(t) => t,
            Err(e) => {
                warn!(source = source_name, context, error = %e, "malformed travel time");
                None
            }
        },
    }
}

/// Loads transports from JSON files in a directory.
#[derive(Debug, Clone)]
pub struct JsonNetworkSource {
    root: PathBuf,
}

impl JsonNetworkSource {
    /// Create a source reading files relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory files are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl NetworkSource for JsonNetworkSource {
    fn load(&self, name: &str) -> Result<Transport, LoadError> {
        let path = self.root.join(name);
        debug!(path = %path.display(), "loading transport");

        let contents = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;

        let dto: TransportDto = serde_json::from_str(&contents).map_err(|e| LoadError::Json {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(dto.into_transport(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const METRO: &str = r#"{
        "type": "Metro",
        "lines": [
            { "name": "A", "stations": ["A1", "A2", "A3"], "times": ["5", "7"] },
            { "name": "B", "stations": ["B1", "B2"], "times": [4] }
        ],
        "transfers": [
            { "from": [0, 0, 1], "to": [0, 1, 0], "time": "3" }
        ]
    }"#;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn loads_transport_from_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "metro.json", METRO);

        let source = JsonNetworkSource::new(dir.path());
        let transport = source.load("metro.json").unwrap();

        assert_eq!(transport.name, "metro");
        assert_eq!(transport.kind, "Metro");
        assert_eq!(transport.lines.len(), 2);
        assert_eq!(transport.lines[0].hop_time(1), Some(Duration::minutes(7)));
        assert_eq!(transport.lines[1].hop_time(0), Some(Duration::minutes(4)));
        assert_eq!(
            transport.transfers,
            vec![Transfer::new(
                StationId::new(0, 0, 1),
                StationId::new(0, 1, 0),
                Some(Duration::minutes(3))
            )]
        );
    }

    #[test]
    fn load_network_assigns_ids_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "metro.json", METRO);
        write(
            dir.path(),
            "tram.json",
            r#"{ "lines": [ { "name": "T", "stations": ["T1", "T2"], "times": ["2.30"] } ] }"#,
        );

        let source = JsonNetworkSource::new(dir.path());
        let network = source.load_network(&["metro.json", "tram.json"]).unwrap();

        assert_eq!(network.transport_count(), 2);
        assert_eq!(network.transports()[1].kind, "tram");
        assert_eq!(network.station_name(&StationId::new(1, 0, 1)), Some("T2"));
    }

    #[test]
    fn malformed_time_becomes_unknown() {
        let dto: TransportDto = serde_json::from_str(
            r#"{ "lines": [ { "name": "A", "stations": ["A1", "A2", "A3"], "times": ["oops", ""] } ] }"#,
        )
        .unwrap();

        let transport = dto.into_transport("bad.json").unwrap();
        assert_eq!(transport.lines[0].hop_time(0), None);
        assert_eq!(transport.lines[0].hop_time(1), None);
    }

    #[test]
    fn odd_numeric_times_become_unknown() {
        let dto: TransportDto = serde_json::from_str(
            r#"{
                "lines": [
                    { "name": "A", "stations": ["A1", "A2", "A3", "A4", "A5", "A6"],
                      "times": [-1, 2.5, null, 4.0, 6] }
                ],
                "transfers": [ { "from": [0, 0, 0], "to": [0, 0, 5], "time": -1 } ]
            }"#,
        )
        .unwrap();

        let transport = dto.into_transport("numbers.json").unwrap();
        let line = &transport.lines[0];
        assert_eq!(line.hop_time(0), None);
        assert_eq!(line.hop_time(1), None);
        assert_eq!(line.hop_time(2), None);
        assert_eq!(line.hop_time(3), Some(Duration::minutes(4)));
        assert_eq!(line.hop_time(4), Some(Duration::minutes(6)));
        assert_eq!(transport.transfers[0].time, None);
    }

    #[test]
    fn missing_times_are_padded() {
        let dto: TransportDto = serde_json::from_str(
            r#"{ "lines": [ { "name": "A", "stations": ["A1", "A2", "A3"], "times": ["1"] } ] }"#,
        )
        .unwrap();

        let transport = dto.into_transport("short.json").unwrap();
        assert_eq!(transport.lines[0].hop_time(0), Some(Duration::minutes(1)));
        assert_eq!(transport.lines[0].hop_time(1), None);
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonNetworkSource::new(dir.path());
        assert!(matches!(source.load("nope.json"), Err(LoadError::Io { .. })));
    }

    #[test]
    fn invalid_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.json", "{ not json");
        let source = JsonNetworkSource::new(dir.path());
        assert!(matches!(source.load("broken.json"), Err(LoadError::Json { .. })));
    }

    #[test]
    fn dangling_transfer_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "metro.json",
            r#"{ "lines": [ { "name": "A", "stations": ["A1"] } ],
                 "transfers": [ { "from": [0, 0, 0], "to": [2, 0, 0], "time": "1" } ] }"#,
        );
        let source = JsonNetworkSource::new(dir.path());
        assert!(matches!(
            source.load_network(&["metro.json"]),
            Err(LoadError::Invalid(DomainError::UnknownTransferStation(_)))
        ));
    }

    #[test]
    fn empty_name_list_fails() {
        let source = JsonNetworkSource::new(".");
        assert!(matches!(source.load_network(&[]), Err(LoadError::Empty)));
    }
}
