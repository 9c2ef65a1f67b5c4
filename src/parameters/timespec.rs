//! Time specification parsing for log queries
//!
//! Log entries are timestamped, and queries over them accept loose, human-written
//! times: named times such as `now` or `yesterday` with an optional offset
//! (`now-30m`, `tomorrow+2.5h`), a bare year or year-month, RFC 3339 timestamps
//! and a handful of common date/date-time layouts. Naive times are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, multispace0, one_of},
    combinator::value,
    number::complete::double,
    sequence::preceded,
    IResult, Parser,
};
use thiserror::Error;

/// Error that can occur while interpreting a time specification
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeSpecError {
    #[error("Cannot interpret time '{input}': {message}")]
    Parse { input: String, message: String },

    #[error("Unknown time unit '{unit}' (expected one of d, h, m, s and their long forms)")]
    UnknownUnit { unit: String },

    #[error("Time '{input}' is out of range")]
    OutOfRange { input: String },
}

const DATETIME_FORMATS: [&str; 9] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%dT%H:%M",
    "%Y/%m/%d %H:%M",
    "%d/%m/%Y %H:%M",
    "%Y%m%dT%H%M",
    "%Y%m%d_%H%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

#[derive(Debug, Clone, Copy, PartialEq)]
enum NamedTime {
    Now,
    Yesterday,
    Tomorrow,
}

impl NamedTime {
    fn offset(self) -> TimeDelta {
        match self {
            NamedTime::Now => TimeDelta::zero(),
            NamedTime::Yesterday => -TimeDelta::hours(24),
            NamedTime::Tomorrow => TimeDelta::hours(24),
        }
    }
}

/// Interpret a time specification relative to the current time
///
/// # Examples
///
/// ```
/// use param_track::parameters::timespec::parse_time_spec;
///
/// let earlier = parse_time_spec("now-2h").unwrap();
/// assert!(earlier < chrono::Utc::now());
///
/// let new_year = parse_time_spec("2025").unwrap();
/// assert_eq!(new_year.to_rfc3339(), "2025-01-01T00:00:00+00:00");
/// ```
pub fn parse_time_spec(input: &str) -> Result<DateTime<Utc>, TimeSpecError> {
    parse_time_spec_at(input, Utc::now())
}

/// Interpret a time specification relative to `now`
pub fn parse_time_spec_at(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, TimeSpecError> {
    let trimmed = input.trim();
    let lowered = trimmed.to_ascii_lowercase();

    if let Ok((rest, named)) = named_time(&lowered) {
        let start = now
            .checked_add_signed(named.offset())
            .ok_or_else(|| TimeSpecError::OutOfRange {
                input: input.to_string(),
            })?;
        let rest = rest.trim();
        if rest.is_empty() {
            return Ok(start);
        }

        let (trailing, (sign, amount, unit)) = offset(rest).map_err(|e| TimeSpecError::Parse {
            input: input.to_string(),
            message: format!("expected an offset such as '+2h' or '-30m' ({:?})", e),
        })?;
        if !trailing.trim().is_empty() {
            return Err(TimeSpecError::Parse {
                input: input.to_string(),
                message: format!("Unexpected trailing characters: '{}'", trailing),
            });
        }

        let delta = offset_delta(sign, amount, unit, input)?;
        return start
            .checked_add_signed(delta)
            .ok_or_else(|| TimeSpecError::OutOfRange {
                input: input.to_string(),
            });
    }

    parse_date(trimmed).ok_or_else(|| TimeSpecError::Parse {
        input: input.to_string(),
        message: "unrecognized date or time layout".to_string(),
    })
}

/// Seconds per unit for offset suffixes
fn unit_seconds(unit: &str) -> Option<f64> {
    match unit {
        "d" | "day" | "days" | "jd" => Some(24.0 * 3600.0),
        "h" | "hr" | "hour" | "hours" => Some(3600.0),
        "m" | "min" | "minute" | "minutes" => Some(60.0),
        "s" | "sec" | "second" | "seconds" => Some(1.0),
        _ => None,
    }
}

fn offset_delta(sign: char, amount: f64, unit: &str, input: &str) -> Result<TimeDelta, TimeSpecError> {
    let per_unit = unit_seconds(unit).ok_or_else(|| TimeSpecError::UnknownUnit {
        unit: unit.to_string(),
    })?;
    let direction = if sign == '-' { -1.0 } else { 1.0 };
    let millis = (direction * amount * per_unit * 1000.0).round();

    let out_of_range = || TimeSpecError::OutOfRange {
        input: input.to_string(),
    };
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return Err(out_of_range());
    }
    TimeDelta::try_milliseconds(millis as i64).ok_or_else(out_of_range)
}

fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let midnight = |date: NaiveDate| date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());

    // Bare year
    if input.len() == 4 && input.bytes().all(|b| b.is_ascii_digit()) {
        let year = input.parse::<i32>().ok()?;
        return midnight(NaiveDate::from_ymd_opt(year, 1, 1)?);
    }

    // Year and month
    if input.len() == 7 {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", input), "%Y-%m-%d") {
            return midnight(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(dt.and_utc());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .and_then(midnight)
}

// Parser functions using nom

/// Parse a named time
fn named_time(input: &str) -> IResult<&str, NamedTime> {
    alt((
        value(NamedTime::Now, alt((tag("now"), tag("current"), tag("today")))),
        value(NamedTime::Yesterday, tag("yesterday")),
        value(NamedTime::Tomorrow, tag("tomorrow")),
    ))
    .parse(input)
}

/// Parse a signed offset such as `+2h` or `- 1.5 days`
fn offset(input: &str) -> IResult<&str, (char, f64, &str)> {
    (
        preceded(multispace0, one_of("+-")),
        preceded(multispace0, double),
        preceded(multispace0, alpha1),
    )
        .parse(input)
}
