//! Mapping of raw provider events to [`NormalizedEvent`].

use chrono::{Datelike, Days, NaiveDate, TimeZone, Timelike};
use serde_json::Value;

use crate::duration::Duration;
use crate::error::{Boundary, CoreError};
use crate::event::{
    EventTime, LocalTimes, NormalizedEnd, NormalizedEvent, NormalizedStart, RawEvent,
};

/// Title used for events without a summary.
pub const UNTITLED: &str = "名称なし";

/// Margin kept from chrono's date limits so every bucket around a start
/// date (its whole Sunday-to-Saturday week) is representable.
const DATE_MARGIN: Days = Days::new(7);

/// Result of normalizing a batch of events.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// Successfully normalized events, in input order.
    pub events: Vec<NormalizedEvent>,
    /// Number of events dropped as invalid.
    pub skipped: usize,
}

/// Normalizes one event, rendering local dates and times in `tz`.
///
/// Empty strings are read as absent. An event whose local start date lies at
/// the edge of the representable calendar is rejected.
pub fn normalize<Tz: TimeZone>(raw: &RawEvent, tz: &Tz) -> Result<NormalizedEvent, CoreError> {
    let start =
        EventTime::parse(&raw.start).map_err(|reason| invalid(raw, Boundary::Start, reason))?;
    let end = EventTime::parse(&raw.end).map_err(|reason| invalid(raw, Boundary::End, reason))?;

    let is_all_day = raw.start.present_date_time().is_none();
    let local = local_times(start, end, tz);
    if !within_calendar(local.start_date) {
        return Err(invalid(
            raw,
            Boundary::Start,
            format!("date {} is out of range", local.start_date),
        ));
    }

    let formatted_date = match local.start_time {
        Some(time) if !is_all_day => format!(
            "{}月{}日 {}:{:02}",
            local.start_date.month(),
            local.start_date.day(),
            time.hour(),
            time.minute()
        ),
        _ => format!(
            "{}月{}日（終日）",
            local.start_date.month(),
            local.start_date.day()
        ),
    };

    Ok(NormalizedEvent {
        summary: text_or(raw.summary.as_deref(), UNTITLED),
        description: text_or(raw.description.as_deref(), ""),
        location: text_or(raw.location.as_deref(), ""),
        start: NormalizedStart {
            date_time: raw.start.present_date_time().map(str::to_string),
            date: raw.start.present_date().map(str::to_string),
            formatted_date,
        },
        end: NormalizedEnd {
            date_time: raw.end.present_date_time().map(str::to_string),
            date: raw.end.present_date().map(str::to_string),
        },
        duration: Duration::between(start, end, tz),
        is_all_day,
        html_link: raw.html_link.clone().unwrap_or_default(),
        status: raw.status.clone().unwrap_or_default(),
        creator: raw
            .creator
            .clone()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
        attendees: raw.attendees.clone().unwrap_or_default(),
        local,
    })
}

/// Normalizes every event, skipping the ones that cannot be normalized.
pub fn normalize_all<Tz: TimeZone>(raws: &[RawEvent], tz: &Tz) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for raw in raws {
        match normalize(raw, tz) {
            Ok(event) => batch.events.push(event),
            Err(err) => {
                tracing::warn!(error = %err, "skipping event");
                batch.skipped += 1;
            }
        }
    }
    batch
}

fn text_or(value: Option<&str>, default: &str) -> String {
    value.filter(|s| !s.is_empty()).unwrap_or(default).to_string()
}

fn within_calendar(date: NaiveDate) -> bool {
    date.checked_sub_days(DATE_MARGIN).is_some() && date.checked_add_days(DATE_MARGIN).is_some()
}

fn local_times<Tz: TimeZone>(start: EventTime, end: EventTime, tz: &Tz) -> LocalTimes {
    let (start_date, start_time) = match start {
        EventTime::Date(date) => (date, None),
        EventTime::DateTime(dt) => {
            let local = dt.with_timezone(tz);
            (local.date_naive(), Some(local.time()))
        }
    };
    let end_time = match end {
        EventTime::Date(_) => None,
        EventTime::DateTime(dt) => Some(dt.with_timezone(tz).time()),
    };
    LocalTimes {
        start_date,
        start_time,
        end_time,
    }
}

fn invalid(raw: &RawEvent, boundary: Boundary, reason: String) -> CoreError {
    let event = match (&raw.summary, &raw.id) {
        (Some(summary), _) => format!("'{summary}'"),
        (None, Some(id)) => format!("id={id}"),
        (None, None) => "(untitled)".to_string(),
    };
    CoreError::InvalidInput {
        event,
        boundary,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventMarker;
    use chrono::{FixedOffset, NaiveDate, NaiveTime};

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn timed(summary: &str, start: &str, end: &str) -> RawEvent {
        RawEvent {
            summary: Some(summary.to_string()),
            start: EventMarker::date_time(start),
            end: EventMarker::date_time(end),
            ..RawEvent::default()
        }
    }

    #[test]
    fn timed_event_formats_local_start() {
        let raw = timed(
            "Standup",
            "2025-05-01T09:05:00+09:00",
            "2025-05-01T09:20:00+09:00",
        );
        let event = normalize(&raw, &jst()).unwrap();

        assert_eq!(event.start.formatted_date, "5月1日 9:05");
        assert!(!event.is_all_day);
        assert_eq!(event.duration.minutes, 15);
        assert_eq!(event.local.start_time, NaiveTime::from_hms_opt(9, 5, 0));
        assert_eq!(event.local.end_time, NaiveTime::from_hms_opt(9, 20, 0));
    }

    #[test]
    fn timed_event_is_shifted_into_report_zone() {
        // 23:30 UTC on Apr 30 is 08:30 on May 1 in JST.
        let raw = timed("Sync", "2025-04-30T23:30:00Z", "2025-05-01T00:00:00Z");
        let event = normalize(&raw, &jst()).unwrap();

        assert_eq!(event.start.formatted_date, "5月1日 8:30");
        assert_eq!(
            event.local.start_date,
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
        );
    }

    #[test]
    fn all_day_event_uses_its_date() {
        let raw = RawEvent {
            summary: Some("Holiday".to_string()),
            start: EventMarker::date("2025-05-03"),
            end: EventMarker::date("2025-05-04"),
            ..RawEvent::default()
        };
        let event = normalize(&raw, &jst()).unwrap();

        assert!(event.is_all_day);
        assert_eq!(event.start.formatted_date, "5月3日（終日）");
        assert_eq!(event.start.date.as_deref(), Some("2025-05-03"));
        assert_eq!(event.start.date_time, None);
        assert_eq!(event.duration.formatted, "終日");
        assert_eq!(event.local.start_time, None);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let raw = RawEvent {
            start: EventMarker::date("2025-05-03"),
            end: EventMarker::date("2025-05-04"),
            ..RawEvent::default()
        };
        let event = normalize(&raw, &jst()).unwrap();

        assert_eq!(event.summary, "名称なし");
        assert_eq!(event.description, "");
        assert_eq!(event.location, "");
        assert_eq!(event.html_link, "");
        assert_eq!(event.status, "");
        assert_eq!(event.creator, serde_json::json!({}));
        assert!(event.attendees.is_empty());
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let raw = RawEvent {
            summary: Some(String::new()),
            location: Some(String::new()),
            start: EventMarker {
                date: Some("2025-05-03".to_string()),
                date_time: Some(String::new()),
                time_zone: None,
            },
            end: EventMarker {
                date: Some("2025-05-04".to_string()),
                date_time: Some(String::new()),
                time_zone: None,
            },
            ..RawEvent::default()
        };
        let event = normalize(&raw, &jst()).unwrap();

        assert_eq!(event.summary, "名称なし");
        assert!(event.is_all_day);
        assert_eq!(event.start.date_time, None);
        assert_eq!(event.start.formatted_date, "5月3日（終日）");
        assert_eq!(event.duration.formatted, "終日");
    }

    #[test]
    fn dates_at_calendar_limits_are_invalid_input() {
        for date in [NaiveDate::MAX, NaiveDate::MIN] {
            let day = date.format("%Y-%m-%d").to_string();
            let raw = RawEvent {
                summary: Some("Edge".to_string()),
                start: EventMarker::date(day.clone()),
                end: EventMarker::date(day),
                ..RawEvent::default()
            };
            let err = normalize(&raw, &jst()).unwrap_err();
            assert!(
                matches!(
                    err,
                    CoreError::InvalidInput {
                        boundary: Boundary::Start,
                        ..
                    }
                ),
                "{date}"
            );
        }
    }

    #[test]
    fn event_without_markers_is_invalid_input() {
        let raw = RawEvent {
            summary: Some("Broken".to_string()),
            end: EventMarker::date("2025-05-04"),
            ..RawEvent::default()
        };
        let err = normalize(&raw, &jst()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidInput {
                boundary: Boundary::Start,
                ..
            }
        ));
    }

    #[test]
    fn normalize_all_skips_invalid_and_keeps_order() {
        let raws = vec![
            timed("A", "2025-05-02T10:00:00+09:00", "2025-05-02T11:00:00+09:00"),
            RawEvent {
                summary: Some("Broken".to_string()),
                ..RawEvent::default()
            },
            timed("B", "2025-05-01T10:00:00+09:00", "2025-05-01T11:00:00+09:00"),
        ];
        let batch = normalize_all(&raws, &jst());

        assert_eq!(batch.skipped, 1);
        let titles: Vec<_> = batch.events.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(titles, ["A", "B"]);
    }

    #[test]
    fn normalized_event_serializes_camel_case() {
        let raw = timed("Standup", "2025-05-01T09:00:00+09:00", "2025-05-01T09:15:00+09:00");
        let value = serde_json::to_value(normalize(&raw, &jst()).unwrap()).unwrap();

        assert_eq!(value["isAllDay"], false);
        assert_eq!(value["start"]["formattedDate"], "5月1日 9:00");
        assert_eq!(value["start"]["date"], serde_json::Value::Null);
        assert_eq!(value["duration"]["formatted"], "15分");
        assert_eq!(value["htmlLink"], "");
        assert!(value.get("local").is_none());
    }
}
