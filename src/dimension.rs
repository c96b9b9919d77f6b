//! Dimension extraction: mapping a record to its bucket for a given facet.
//!
//! Every function here is pure. A record whose value is missing or malformed for a dimension has no
//! bucket (`None`) and is left out of that dimension's aggregation; extraction never fails.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{DashboardError, DashboardResult};
use crate::types::{DataType, Record, Schema};

/// Canonical month names in calendar order.
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Maps a two-digit month (`"01"`..=`"12"`) to its canonical name.
pub fn month_name(two_digit: &str) -> Option<&'static str> {
    if two_digit.len() != 2 || !two_digit.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month: usize = two_digit.parse().ok()?;
    (1..=12).contains(&month).then(|| MONTH_NAMES[month - 1])
}

/// Zero-based calendar position of a canonical month name.
pub fn month_index(name: &str) -> Option<usize> {
    MONTH_NAMES.iter().position(|m| *m == name)
}

/// One half-open `[lower, upper)` range of elapsed minutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationBin {
    pub label: &'static str,
    pub lower_minutes: f64,
    /// `None` means unbounded.
    pub upper_minutes: Option<f64>,
}

impl DurationBin {
    pub fn contains(&self, minutes: f64) -> bool {
        minutes >= self.lower_minutes && self.upper_minutes.is_none_or(|upper| minutes < upper)
    }
}

const fn bin(label: &'static str, lower_minutes: f64, upper_minutes: Option<f64>) -> DurationBin {
    DurationBin {
        label,
        lower_minutes,
        upper_minutes,
    }
}

/// Fixed duration bins, ordered and exhaustive over `[0, ∞)`.
pub const DURATION_BINS: [DurationBin; 8] = [
    bin("under 30 minutes", 0.0, Some(30.0)),
    bin("30–45m", 30.0, Some(45.0)),
    bin("45–60m", 45.0, Some(60.0)),
    bin("1–24h", 60.0, Some(1440.0)),
    bin("24–48h", 1440.0, Some(2880.0)),
    bin("48–72h", 2880.0, Some(4320.0)),
    bin("72h–5 days", 4320.0, Some(7200.0)),
    bin("over 5 days", 7200.0, None),
];

/// Position in [`DURATION_BINS`] of the first bin containing `minutes`.
///
/// `None` for negative or non-finite input.
pub fn duration_bin_index(minutes: f64) -> Option<usize> {
    if !minutes.is_finite() {
        return None;
    }
    DURATION_BINS.iter().position(|b| b.contains(minutes))
}

pub fn duration_bin(minutes: f64) -> Option<&'static DurationBin> {
    duration_bin_index(minutes).map(|idx| &DURATION_BINS[idx])
}

const INSTANT_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a timestamp as a naive UTC instant.
///
/// Accepts `YYYY-MM-DD[ T]HH:MM[:SS[.fff]]`, RFC 3339 and bare dates (midnight). Values without an
/// offset are taken as UTC; RFC 3339 values are shifted to UTC, so a start/end pair may mix the two.
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in INSTANT_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Elapsed minutes between two timestamps, or `None` if either fails to parse or `end < start`.
pub fn elapsed_minutes(start: &str, end: &str) -> Option<f64> {
    let start = parse_instant(start)?;
    let end = parse_instant(end)?;
    if end < start {
        return None;
    }
    let elapsed = end - start;
    Some(elapsed.num_milliseconds() as f64 / 60_000.0)
}

fn digits(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_digit)
}

/// `true` when `raw` starts with `YYYY-MM-DD`, optionally followed by `[ T]HH:MM...`.
pub fn is_date_like(raw: &str) -> bool {
    let b = raw.as_bytes();
    if b.len() < 10 || !digits(&b[0..4]) || b[4] != b'-' || !digits(&b[5..7]) || b[7] != b'-' {
        return false;
    }
    if !digits(&b[8..10]) {
        return false;
    }
    match b.len() {
        10 => true,
        n if n >= 16 => {
            (b[10] == b' ' || b[10] == b'T')
                && digits(&b[11..13])
                && b[13] == b':'
                && digits(&b[14..16])
        }
        _ => false,
    }
}

/// Month bucket of a date or date-time string.
pub fn month_bucket(raw: &str) -> Option<&'static str> {
    if !is_date_like(raw) {
        return None;
    }
    month_name(&raw[5..7])
}

/// Year bucket: the leading four digits of an ISO date (or a bare year).
pub fn year_bucket(raw: &str) -> Option<&str> {
    let b = raw.as_bytes();
    if b.len() < 4 || !digits(&b[0..4]) {
        return None;
    }
    if b.len() > 4 && b[4] != b'-' {
        return None;
    }
    Some(&raw[0..4])
}

/// A validated facet of a record, with its extraction strategy.
///
/// This is the key of the shared filter: two views using the same `Dimension` filter each other on
/// exactly the same buckets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    /// The raw field value, verbatim.
    Categorical(String),
    /// Month name of a date / date-time field.
    Month(String),
    /// Year of a date field.
    Year(String),
    /// Duration-bin label of the time elapsed between two timestamp fields.
    Duration { start: String, end: String },
}

impl Dimension {
    pub fn categorical(field: impl Into<String>) -> Self {
        Self::Categorical(field.into())
    }

    pub fn month(field: impl Into<String>) -> Self {
        Self::Month(field.into())
    }

    pub fn year(field: impl Into<String>) -> Self {
        Self::Year(field.into())
    }

    pub fn duration(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::Duration {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Pick a strategy from the declared field type: `Date` fields bucket by month, everything
    /// else is categorical.
    pub fn infer(schema: &Schema, field: &str) -> DashboardResult<Self> {
        let f = schema.field(field).ok_or_else(|| unknown_field(schema, field))?;
        Ok(match f.data_type {
            DataType::Date => Self::Month(f.name.clone()),
            _ => Self::Categorical(f.name.clone()),
        })
    }

    /// Primary field (the start field for durations).
    pub fn field(&self) -> &str {
        match self {
            Self::Categorical(f) | Self::Month(f) | Self::Year(f) => f,
            Self::Duration { start, .. } => start,
        }
    }

    pub fn is_duration(&self) -> bool {
        matches!(self, Self::Duration { .. })
    }

    /// Fail if any field this dimension reads is missing from `schema`.
    pub fn validate(&self, schema: &Schema) -> DashboardResult<()> {
        let fields = match self {
            Self::Duration { start, end } => vec![start.as_str(), end.as_str()],
            other => vec![other.field()],
        };
        for field in fields {
            if schema.index_of(field).is_none() {
                return Err(unknown_field(schema, field));
            }
        }
        Ok(())
    }

    /// Bucket of `record` for this dimension, or `None` when the record has no bucket here.
    pub fn extract(&self, record: &Record<'_>) -> Option<String> {
        match self {
            Self::Categorical(field) => record.get(field).and_then(|v| v.to_label()),
            Self::Month(field) => record
                .text(field)
                .and_then(month_bucket)
                .map(str::to_owned),
            Self::Year(field) => record
                .text(field)
                .and_then(year_bucket)
                .map(str::to_owned),
            Self::Duration { start, end } => {
                let minutes = elapsed_minutes(record.text(start)?, record.text(end)?)?;
                duration_bin(minutes).map(|b| b.label.to_owned())
            }
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Categorical(field) => write!(f, "{field}"),
            Self::Month(field) => write!(f, "{field}:month"),
            Self::Year(field) => write!(f, "{field}:year"),
            Self::Duration { start, end } => write!(f, "{start}..{end}:duration"),
        }
    }
}

fn unknown_field(schema: &Schema, field: &str) -> DashboardError {
    DashboardError::UnknownField {
        field: field.to_string(),
        available: schema.field_names().map(str::to_owned).collect(),
    }
}
