//! Wall-clock access and the ISO-8601 date format used in map state strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

/// Format used when a date is written back into state (`2013-05-14T00:00:00Z`).
pub const ISO8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date: {input:?}")]
pub struct TimeParseError {
    pub input: String,
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    fn utc_hour(&self) -> u32 {
        self.now().hour()
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant. Used for replay and tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn format_iso8601(t: DateTime<Utc>) -> String {
    t.format(ISO8601_FORMAT).to_string()
}

/// Parse an ISO-8601-like date.
///
/// Accepted forms:
/// - RFC 3339 with an offset or `Z`
/// - `YYYY-MM-DDThh:mm[:ss[.fff]]` without offset (taken as UTC)
/// - `YYYY-MM-DD` (midnight UTC)
pub fn parse_iso8601(input: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = input.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(t.and_utc());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(t) = d.and_hms_opt(0, 0, 0) {
            return Ok(t.and_utc());
        }
    }

    Err(TimeParseError {
        input: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock, format_iso8601, parse_iso8601};
    use chrono::{TimeZone, Utc};

    #[test]
    fn parses_date_only_as_utc_midnight() {
        let t = parse_iso8601("2013-05-14").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2013, 5, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_rfc3339_and_naive_datetimes() {
        let expected = Utc.with_ymd_and_hms(2013, 5, 14, 12, 30, 0).unwrap();
        assert_eq!(parse_iso8601("2013-05-14T12:30:00Z").unwrap(), expected);
        assert_eq!(parse_iso8601("2013-05-14T14:30:00+02:00").unwrap(), expected);
        assert_eq!(parse_iso8601("2013-05-14T12:30:00").unwrap(), expected);
        assert_eq!(parse_iso8601("2013-05-14T12:30").unwrap(), expected);
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_iso8601("not-a-date").unwrap_err();
        assert_eq!(err.input, "not-a-date");
        assert!(parse_iso8601("").is_err());
        assert!(parse_iso8601("2013-13-40").is_err());
    }

    #[test]
    fn format_round_trips_through_parse() {
        let t = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let s = format_iso8601(t);
        assert_eq!(s, "2020-01-02T03:04:05Z");
        assert_eq!(parse_iso8601(&s).unwrap(), t);
    }

    #[test]
    fn fixed_clock_reports_its_hour() {
        let c = FixedClock::new(Utc.with_ymd_and_hms(2020, 6, 1, 17, 45, 0).unwrap());
        assert_eq!(c.utc_hour(), 17);
    }
}
