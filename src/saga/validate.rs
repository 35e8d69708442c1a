use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use thiserror::Error;

/// Normalized request interval. Both bounds are UTC instants at millisecond
/// precision; `from <= to` holds for every value this module hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveInterval {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid {field} format, expected YYYY-MM-DD")]
    InvalidDateFormat { field: &'static str },
    #[error("invalid {field} format, expected 24-hour HH:MM")]
    InvalidTimeFormat { field: &'static str },
    #[error("{0}")]
    RangeInverted(&'static str),
    #[error("leave cannot start in the past")]
    PastDate,
}

fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDateFormat { field })
}

fn parse_time(value: &str, field: &'static str) -> Result<NaiveTime, ValidationError> {
    // chrono accepts single-digit hours; the contract is strict HH:MM.
    if value.len() != 5 || value.as_bytes()[2] != b':' {
        return Err(ValidationError::InvalidTimeFormat { field });
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| ValidationError::InvalidTimeFormat { field })
}

/// Validates and normalizes a requested leave interval.
///
/// Rule order, first failure wins: date formats, time formats, interval
/// ordering, non-past start. Dates without a time expand to the full day
/// (00:00:00.000 through 23:59:59.999). The non-past check compares at day
/// granularity unless a start time was supplied. `now` is passed in so the
/// clock is caller-owned.
pub fn validate_range(
    from_date: &str,
    to_date: &str,
    from_time: Option<&str>,
    to_time: Option<&str>,
    now: DateTime<Utc>,
) -> Result<LeaveInterval, ValidationError> {
    let from_day = parse_date(from_date, "from date")?;
    let to_day = parse_date(to_date, "to date")?;

    let from_clock = from_time.map(|t| parse_time(t, "from time")).transpose()?;
    let to_clock = to_time.map(|t| parse_time(t, "to time")).transpose()?;

    let start_of_day = NaiveTime::MIN;
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap();

    let from = Utc.from_utc_datetime(&from_day.and_time(from_clock.unwrap_or(start_of_day)));
    let to = Utc.from_utc_datetime(&to_day.and_time(to_clock.unwrap_or(end_of_day)));

    if from > to {
        let detail = if from_clock.is_none() && to_clock.is_none() {
            "from date cannot be later than to date"
        } else if from_clock.is_some() {
            "from time cannot place the start after the end of the range"
        } else {
            "to time cannot place the end before the start of the range"
        };
        return Err(ValidationError::RangeInverted(detail));
    }

    let in_past = match from_clock {
        Some(_) => from < now,
        None => from_day < now.date_naive(),
    };
    if in_past {
        return Err(ValidationError::PastDate);
    }

    Ok(LeaveInterval { from, to })
}
