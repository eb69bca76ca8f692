//! Heuristic classification of grid filter values.
//!
//! Grid cells arrive as strings. The value is probed in a fixed order —
//! integer, then ISO-8601 instant, then plain text — and the first classifier
//! that matches wins. Each classifier is a total function over the input so
//! the ordering and fallback stay explicit and testable on their own.

use chrono::{DateTime, Utc};

/// Outcome of running the classifier chain over one filter value.
#[derive(Clone, Debug, PartialEq)]
pub enum Classified {
    Int(i32),
    Instant(DateTime<Utc>),
    Text(String),
}

/// `"5"` → 5. The whole string must be an integer.
pub fn as_int(value: &str) -> Option<i32> {
    value.parse().ok()
}

/// `"2023-05-01T00:00:00Z"` → instant. RFC 3339, `Z` or numeric offset.
pub fn as_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Run the chain in order; text is the fallback.
pub fn classify(value: &str) -> Classified {
    if let Some(n) = as_int(value) {
        return Classified::Int(n);
    }
    if let Some(ts) = as_instant(value) {
        return Classified::Instant(ts);
    }
    Classified::Text(value.to_owned())
}
