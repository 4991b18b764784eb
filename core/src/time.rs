//! Time related utils.

use crate::Error;

/// DateTime is the alias for chrono::DateTime<Utc>.
pub type DateTime = chrono::DateTime<chrono::Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    chrono::Utc::now()
}

/// Seconds since the Unix epoch, as used by the `se` field of a SAS token.
pub fn unix_timestamp(t: DateTime) -> i64 {
    t.timestamp()
}

/// Parse time from RFC3339.
///
/// All of them are valid time:
///
/// - `2022-03-13T07:20:04Z`
/// - `2022-03-01T08:12:34+00:00`
/// - `2022-03-01T08:12:34.00+00:00`
pub fn parse_rfc3339(s: &str) -> crate::Result<DateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|v| v.into())
        .map_err(|e| Error::unexpected(format!("failed to parse rfc3339 time: {s}")).with_source(e))
}
