//! Raw calendar events as delivered by the provider, and their normalized form.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::duration::Duration;

/// A calendar event resource as returned by the Google Calendar v3 API.
///
/// Only the fields the reports read are modelled; everything else in the
/// resource is ignored during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub start: EventMarker,
    #[serde(default)]
    pub end: EventMarker,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Value>>,
}

/// One boundary of an event.
///
/// All-day events carry `date` (`YYYY-MM-DD`); timed events carry
/// `date_time` (RFC 3339). The end date of an all-day event is exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMarker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventMarker {
    /// An all-day marker.
    pub fn date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Self::default()
        }
    }

    /// A timed marker.
    pub fn date_time(date_time: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            ..Self::default()
        }
    }

    /// `date`, with an empty string read as absent.
    pub fn present_date(&self) -> Option<&str> {
        non_empty(self.date.as_deref())
    }

    /// `dateTime`, with an empty string read as absent.
    pub fn present_date_time(&self) -> Option<&str> {
        non_empty(self.date_time.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// A parsed event boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    /// Calendar date of an all-day boundary.
    Date(NaiveDate),
    /// Instant of a timed boundary, with the offset the provider sent.
    DateTime(DateTime<FixedOffset>),
}

impl EventTime {
    /// Parses a marker, preferring `dateTime` over `date` when both are present.
    /// Empty strings count as absent.
    pub fn parse(marker: &EventMarker) -> Result<Self, String> {
        if let Some(dt) = marker.present_date_time() {
            return DateTime::parse_from_rfc3339(dt)
                .map(Self::DateTime)
                .map_err(|err| format!("invalid dateTime '{dt}': {err}"));
        }
        if let Some(date) = marker.present_date() {
            return NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map(Self::Date)
                .map_err(|err| format!("invalid date '{date}': {err}"));
        }
        Err("no date or dateTime".to_string())
    }
}

/// Render-agnostic event shape produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: NormalizedStart,
    pub end: NormalizedEnd,
    pub duration: Duration,
    pub is_all_day: bool,
    pub html_link: String,
    pub status: String,
    pub creator: Value,
    pub attendees: Vec<Value>,
    /// Wall-clock view of the event in the report's time zone.
    #[serde(skip)]
    pub local: LocalTimes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStart {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub formatted_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEnd {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

/// Local calendar date and clock times of an event.
///
/// Times are `None` for all-day events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTimes {
    pub start_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}
