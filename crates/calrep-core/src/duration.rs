//! Elapsed time between an event's start and end.
//!
//! All-day events count calendar days between their dates (the end date is
//! exclusive, so a single-day event spans one day). Timed events count
//! minutes between instants, rounding half a minute up.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::event::EventTime;

pub const MINUTES_PER_DAY: i64 = 24 * 60;

const MS_PER_MINUTE: i64 = 60_000;

/// Elapsed time of an event with its display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Duration {
    pub minutes: i64,
    pub formatted: String,
}

impl Duration {
    /// Duration between two boundaries.
    ///
    /// Two all-day dates use calendar-day arithmetic; any other pair is
    /// treated as timed, with a bare date standing for local midnight in `tz`.
    /// A negative span is reported as-is.
    pub fn between<Tz: TimeZone>(start: EventTime, end: EventTime, tz: &Tz) -> Self {
        match (start, end) {
            (EventTime::Date(start), EventTime::Date(end)) => {
                Self::all_day((end - start).num_days())
            }
            (start, end) => {
                let elapsed = instant(end, tz) - instant(start, tz);
                Self::timed(round_to_minutes(elapsed.num_milliseconds()))
            }
        }
    }

    /// An all-day span of `days` calendar days.
    pub fn all_day(days: i64) -> Self {
        let formatted = if days == 1 {
            "終日".to_string()
        } else {
            format!("{days}日間")
        };
        Self {
            minutes: days * MINUTES_PER_DAY,
            formatted,
        }
    }

    /// A timed span of `minutes` minutes.
    pub fn timed(minutes: i64) -> Self {
        Self {
            minutes,
            formatted: format_minutes(minutes),
        }
    }
}

/// Formats minutes as "H時間M分".
///
/// The hour part is omitted when zero. The minute part is omitted only when
/// it is zero and hours are present, so zero renders as "0分".
///
/// Negative values keep their sign ("-1時間30分") instead of collapsing to an
/// empty string, so an end before its start stays visible in reports.
pub fn format_minutes(minutes: i64) -> String {
    if minutes < 0 {
        return format!("-{}", format_magnitude(minutes.unsigned_abs()));
    }
    format_magnitude(minutes.unsigned_abs())
}

fn format_magnitude(minutes: u64) -> String {
    let hours = minutes / 60;
    let minutes = minutes % 60;

    let mut formatted = String::new();
    if hours > 0 {
        formatted.push_str(&format!("{hours}時間"));
    }
    if minutes > 0 || hours == 0 {
        formatted.push_str(&format!("{minutes}分"));
    }
    formatted
}

/// Rounds milliseconds to whole minutes, halves toward positive infinity.
const fn round_to_minutes(ms: i64) -> i64 {
    (ms + MS_PER_MINUTE / 2).div_euclid(MS_PER_MINUTE)
}

fn instant<Tz: TimeZone>(time: EventTime, tz: &Tz) -> DateTime<Utc> {
    match time {
        EventTime::DateTime(dt) => dt.with_timezone(&Utc),
        EventTime::Date(date) => local_midnight_to_utc(date, tz),
    }
}

/// Converts local midnight of `date` in `tz` to UTC.
/// Picks the earlier time when ambiguous and 1am when midnight falls in a DST gap.
pub fn local_midnight_to_utc<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            let one_am = NaiveTime::from_hms_opt(1, 0, 0).unwrap_or(NaiveTime::MIN);
            tz.from_local_datetime(&date.and_time(one_am)).earliest()
        })
        .map_or_else(
            || Utc.from_utc_datetime(&midnight),
            |dt| dt.with_timezone(&Utc),
        )
}
