//! Daily, weekly and monthly aggregation of events.
//!
//! Every event lands in the bucket of its local start date. All-day events
//! are counted but contribute no minutes. Buckets are keyed by zero-padded
//! date strings so that key order is chronological order.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::duration::format_minutes;
use crate::event::NormalizedEvent;
use crate::options::SummaryMode;

/// Size of an aggregation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    /// Weeks start on Sunday.
    Weekly,
    Monthly,
}

impl Granularity {
    /// The granularity requested by a summary mode, if any.
    pub const fn from_summary_mode(mode: SummaryMode) -> Option<Self> {
        match mode {
            SummaryMode::None => None,
            SummaryMode::Daily => Some(Self::Daily),
            SummaryMode::Weekly => Some(Self::Weekly),
            SummaryMode::Monthly => Some(Self::Monthly),
        }
    }

    /// Display name used in report headers.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Daily => "日別",
            Self::Weekly => "週別",
            Self::Monthly => "月別",
        }
    }

    fn key(self, date: NaiveDate) -> String {
        match self {
            Self::Daily => date.format("%Y-%m-%d").to_string(),
            Self::Weekly => week_start(date).format("%Y-%m-%d").to_string(),
            Self::Monthly => date.format("%Y-%m").to_string(),
        }
    }

    fn label(self, date: NaiveDate) -> String {
        match self {
            Self::Daily => long_date(date),
            Self::Weekly => {
                let start = week_start(date);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
                format!("{} 〜 {}", long_date(start), long_date(end))
            }
            Self::Monthly => format!("{}年{}月", date.year(), date.month()),
        }
    }
}

/// Aggregated events for one day, week or month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub key: String,
    pub label: String,
    pub total_minutes: i64,
    pub event_count: usize,
    /// `total_minutes` in display form, filled in once aggregation is done.
    pub formatted: String,
}

/// Buckets in key order plus totals over every kept event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub granularity: Granularity,
    pub buckets: Vec<Bucket>,
    pub total_events: usize,
    pub total_minutes: i64,
}

/// Groups events into buckets of the given granularity.
pub fn bucket(events: &[NormalizedEvent], granularity: Granularity) -> Summary {
    let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();

    for event in events {
        let date = event.local.start_date;
        let entry = buckets
            .entry(granularity.key(date))
            .or_insert_with_key(|key| Bucket {
                key: key.clone(),
                label: granularity.label(date),
                total_minutes: 0,
                event_count: 0,
                formatted: String::new(),
            });
        entry.event_count += 1;
        if !event.is_all_day {
            entry.total_minutes += event.duration.minutes;
        }
    }

    let buckets: Vec<Bucket> = buckets
        .into_values()
        .map(|mut bucket| {
            bucket.formatted = format_minutes(bucket.total_minutes);
            bucket
        })
        .collect();

    Summary {
        granularity,
        buckets,
        total_events: events.len(),
        total_minutes: timed_minutes(events),
    }
}

/// Sum of durations of the events that are not all-day.
pub fn timed_minutes(events: &[NormalizedEvent]) -> i64 {
    events
        .iter()
        .filter(|event| !event.is_all_day)
        .map(|event| event.duration.minutes)
        .sum()
}

/// The Sunday on or before `date`, clamped to the first representable date.
fn week_start(date: NaiveDate) -> NaiveDate {
    let days_since_sunday = date.weekday().num_days_from_sunday();
    date.checked_sub_days(Days::new(u64::from(days_since_sunday)))
        .unwrap_or(NaiveDate::MIN)
}

fn long_date(date: NaiveDate) -> String {
    format!("{}年{}月{}日", date.year(), date.month(), date.day())
}
