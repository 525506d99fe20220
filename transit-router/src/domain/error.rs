//! Domain error types.
//!
//! These errors represent validation failures in network data. They are
//! distinct from IO/parse errors of the loader.

/// Domain-level errors for network validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A line must have one travel time per consecutive station pair
    #[error("line {line:?} has {stations} stations but {times} travel times")]
    TimeCountMismatch {
        line: String,
        stations: usize,
        times: usize,
    },

    /// A line needs at least one station
    #[error("line {0:?} has no stations")]
    EmptyLine(String),

    /// Travel times cannot be negative
    #[error("line {line:?} has a negative travel time on hop {hop}")]
    NegativeHopTime { line: String, hop: usize },

    /// Travel times cannot be negative
    #[error("transfer {from} - {to} has a negative travel time")]
    NegativeTransferTime {
        from: crate::domain::StationId,
        to: crate::domain::StationId,
    },

    /// Transfer endpoint does not exist in the network
    #[error("transfer references unknown station {0}")]
    UnknownTransferStation(crate::domain::StationId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationId;

    #[test]
    fn error_display() {
        let err = DomainError::TimeCountMismatch {
            line: "Red".into(),
            stations: 3,
            times: 1,
        };
        assert_eq!(
            err.to_string(),
            "line \"Red\" has 3 stations but 1 travel times"
        );

        let err = DomainError::EmptyLine("Blue".into());
        assert_eq!(err.to_string(), "line \"Blue\" has no stations");

        let err = DomainError::UnknownTransferStation(StationId::new(4, 0, 1));
        assert_eq!(err.to_string(), "transfer references unknown station 4/0/1");

        let err = DomainError::NegativeTransferTime {
            from: StationId::new(0, 0, 1),
            to: StationId::new(0, 1, 0),
        };
        assert_eq!(
            err.to_string(),
            "transfer 0/0/1 - 0/1/0 has a negative travel time"
        );
    }
}
