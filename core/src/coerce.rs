//! Conversion of raw tokens into typed scalars.
//!
//! The target kind comes from the declaration's default value (or the first
//! element of its choice set). Conversions are strict: anything that is not
//! a complete literal of the target kind is rejected.

use std::sync::LazyLock;

use chrono::{NaiveDateTime, TimeDelta};
use regex::Regex;

use crate::value::{Scalar, TIMESTAMP_FORMAT, ValueKind};

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}$").expect("static regex must compile")
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:ns|us|µs|μs|ms|s|m|h))+$")
        .expect("static regex must compile")
});

static DURATION_SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]*)?|\.[0-9]+)(ns|us|µs|μs|ms|s|m|h)").expect("static regex must compile")
});

/// Converts `token` into a scalar of `kind`.
///
/// Returns `None` when the token is not a valid literal of that kind.
///
/// # Examples
///
/// ```
/// use optparse_core::{Scalar, ValueKind, coerce};
///
/// assert_eq!(coerce("42", ValueKind::Int), Some(Scalar::Int(42)));
/// assert_eq!(coerce("yes", ValueKind::Bool), None);
/// assert_eq!(coerce("1h30m", ValueKind::Duration).map(|s| s.to_string()), Some("1h30m0s".into()));
/// ```
pub fn coerce(token: &str, kind: ValueKind) -> Option<Scalar> {
    match kind {
        ValueKind::Bool => parse_bool(token).map(Scalar::Bool),
        ValueKind::String => Some(Scalar::String(token.to_string())),
        ValueKind::Int => token.parse::<i64>().ok().map(Scalar::Int),
        ValueKind::Float => token.parse::<f64>().ok().map(Scalar::Float),
        ValueKind::Timestamp => parse_timestamp(token).map(Scalar::Timestamp),
        ValueKind::Duration => parse_duration(token).map(Scalar::Duration),
    }
}

/// Parses a boolean literal (`1`, `t`, `T`, `true`, `TRUE`, `True` and their
/// false counterparts).
pub fn parse_bool(token: &str) -> Option<bool> {
    match token {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Parses a `YYYY-MM-DD hh:mm` timestamp (24h, zero-padded).
pub fn parse_timestamp(token: &str) -> Option<NaiveDateTime> {
    if !TIMESTAMP_RE.is_match(token) {
        return None;
    }
    NaiveDateTime::parse_from_str(token, TIMESTAMP_FORMAT).ok()
}

/// Parses a unit-suffixed duration literal such as `1h30m`, `1.5s` or
/// `-250ms`. A bare `0` is accepted.
pub fn parse_duration(token: &str) -> Option<TimeDelta> {
    let (negative, body) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    if body == "0" {
        return Some(TimeDelta::zero());
    }
    if !DURATION_RE.is_match(body) {
        return None;
    }

    let mut total: u128 = 0;
    for segment in DURATION_SEGMENT_RE.captures_iter(body) {
        let unit = unit_nanos(&segment[2])?;
        let (whole, fraction) = match segment[1].split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (&segment[1], ""),
        };

        let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        total = total.checked_add(whole.checked_mul(unit)?)?;

        // Digits past nanosecond resolution of the largest unit cannot
        // change the result.
        let mut scaled: u128 = 0;
        let mut scale: u128 = 1;
        for digit in fraction.bytes().take(24) {
            scaled = scaled * 10 + u128::from(digit - b'0');
            scale *= 10;
        }
        total = total.checked_add(scaled * unit / scale)?;
    }

    let limit = if negative {
        i64::MAX as u128 + 1
    } else {
        i64::MAX as u128
    };
    if total > limit {
        return None;
    }
    let nanos = if negative {
        (total as i128).wrapping_neg() as i64
    } else {
        total as i64
    };
    Some(TimeDelta::nanoseconds(nanos))
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    };
    Some(nanos)
}
