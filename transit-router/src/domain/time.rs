//! Travel time handling for network data.
//!
//! Network files give travel times as "M" (whole minutes) or "M.S"
//! (minutes and seconds). An empty value means the source omitted the time;
//! that is represented as `None` rather than a sentinel number so it can
//! never leak into arithmetic.

use chrono::Duration;

/// Error returned when parsing an invalid travel time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid travel time {input:?}: {reason}")]
pub struct TimeError {
    input: String,
    reason: &'static str,
}

impl TimeError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// A travel time that may be unknown.
pub type TravelTime = Option<Duration>;

/// Parse a travel time in "M" or "M.S" form.
///
/// Returns `Ok(None)` for an empty (omitted) value.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use transit_router::domain::parse_travel_time;
///
/// assert_eq!(parse_travel_time("5"), Ok(Some(Duration::minutes(5))));
/// assert_eq!(parse_travel_time("2.30"), Ok(Some(Duration::seconds(150))));
/// assert_eq!(parse_travel_time(""), Ok(None));
/// assert!(parse_travel_time("fast").is_err());
/// ```
pub fn parse_travel_time(s: &str) -> Result<TravelTime, TimeError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (mins, secs) = match trimmed.split_once('.') {
        Some((mins, secs)) => (mins, Some(secs)),
        None => (trimmed, None),
    };

    let mins: u32 = mins
        .parse()
        .map_err(|_| TimeError::new(s, "minutes must be a non-negative integer"))?;

    let secs: u32 = match secs {
        Some(secs) => secs
            .parse()
            .map_err(|_| TimeError::new(s, "seconds must be a non-negative integer"))?,
        None => 0,
    };

    Ok(Some(
        Duration::minutes(i64::from(mins)) + Duration::seconds(i64::from(secs)),
    ))
}

/// Format a duration as "M:SS" for display.
pub fn format_duration(d: Duration) -> String {
    let total = d.num_seconds();
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_minutes() {
        assert_eq!(parse_travel_time("0"), Ok(Some(Duration::zero())));
        assert_eq!(parse_travel_time("12"), Ok(Some(Duration::minutes(12))));
        assert_eq!(parse_travel_time(" 3 "), Ok(Some(Duration::minutes(3))));
    }

    #[test]
    fn minutes_and_seconds() {
        assert_eq!(parse_travel_time("1.5"), Ok(Some(Duration::seconds(65))));
        assert_eq!(parse_travel_time("1.45"), Ok(Some(Duration::seconds(105))));
    }

    #[test]
    fn empty_is_unknown() {
        assert_eq!(parse_travel_time(""), Ok(None));
        assert_eq!(parse_travel_time("   "), Ok(None));
    }

    #[test]
    fn reject_malformed() {
        assert!(parse_travel_time("-1").is_err());
        assert!(parse_travel_time("abc").is_err());
        assert!(parse_travel_time("1.").is_err());
        assert!(parse_travel_time(".5").is_err());
        assert!(parse_travel_time("1.2.3").is_err());
    }

    #[test]
    fn error_display() {
        let err = parse_travel_time("x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid travel time \"x\": minutes must be a non-negative integer"
        );
    }

    #[test]
    fn format() {
        assert_eq!(format_duration(Duration::seconds(65)), "1:05");
        assert_eq!(format_duration(Duration::minutes(12)), "12:00");
    }
}
