use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Wall time between a trip's start and end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elapsed {
    /// Malformed input, or an end that is not after the start.
    Unknown,
    UnderOneMinute,
    Span { days: i64, hours: i64, minutes: i64 },
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unknown => f.write_str("unknown"),
            Self::UnderOneMinute => f.write_str("<1m"),
            Self::Span {
                days,
                hours,
                minutes,
            } => {
                let parts: Vec<String> = [(days, 'd'), (hours, 'h'), (minutes, 'm')]
                    .into_iter()
                    .filter(|(n, _)| *n != 0)
                    .map(|(n, unit)| format!("{n}{unit}"))
                    .collect();
                f.write_str(&parts.join(" "))
            }
        }
    }
}

/// Elapsed time from `start_date start_time` to `end_date end_time`.
/// Dates are `YYYY-MM-DD`; times are `HH:MM` or `HH:MM:SS` and default to
/// midnight when absent or blank.
pub fn elapsed(
    start_date: &str,
    start_time: Option<&str>,
    end_date: &str,
    end_time: Option<&str>,
) -> Elapsed {
    let (Some(start), Some(end)) = (
        combine(start_date, start_time),
        combine(end_date, end_time),
    ) else {
        return Elapsed::Unknown;
    };

    if end <= start {
        return Elapsed::Unknown;
    }

    let total = (end - start).num_seconds();
    let days = total / SECONDS_PER_DAY;
    let rest = total - days * SECONDS_PER_DAY;
    let hours = rest / SECONDS_PER_HOUR;
    let rest = rest - hours * SECONDS_PER_HOUR;
    let minutes = rest / SECONDS_PER_MINUTE;

    if days == 0 && hours == 0 && minutes == 0 {
        Elapsed::UnderOneMinute
    } else {
        Elapsed::Span {
            days,
            hours,
            minutes,
        }
    }
}

fn combine(date: &str, time: Option<&str>) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = match time.map(str::trim).filter(|t| !t.is_empty()) {
        None => NaiveTime::MIN,
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
            .ok()?,
    };
    Some(date.and_time(time))
}
