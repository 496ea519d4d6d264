//! Derivation of `decision_time_taken_sec`.
//!
//! This is a soft-fail field: a missing or unparseable timestamp yields
//! `None`, never a validation error.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a client-supplied timestamp string.
///
/// RFC 3339 first (what the browser client sends), then the naive
/// `YYYY-MM-DD HH:MM:SS[.fff]` forms taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    None
}

/// Elapsed seconds between the permission icon appearing and the decision.
///
/// Returns `None` when either timestamp is absent or unparseable. The
/// result may be negative when the client reports timestamps out of
/// order; that judgment is left to downstream analysis.
pub fn decision_seconds(icon: Option<&str>, decision: Option<&str>) -> Option<f64> {
    let start = parse_timestamp(icon?)?;
    let end = parse_timestamp(decision?)?;
    Some((end - start).num_milliseconds() as f64 / 1000.0)
}
