//! Output encodings for reports.
//!
//! This is the only place the output format and the summary mode are
//! inspected together; earlier stages never see either.

use std::fmt;

use chrono::{Datelike, NaiveTime, Timelike};
use serde::Serialize;
use serde_json::Value;

use crate::bucket::{Bucket, Granularity, Summary};
use crate::duration::format_minutes;
use crate::error::CoreError;
use crate::event::NormalizedEvent;
use crate::options::{OutputFormat, ReportPeriod};
use crate::process::{Exclusion, Report};

/// Shown instead of an empty listing.
pub const NO_EVENTS: &str = "指定期間の予定は見つかりませんでした";

const CSV_EVENT_HEADER: &str = "日付,開始時間,終了時間,所要時間,タイトル,場所,説明";
const CSV_SUMMARY_HEADER: &str = "期間,予定数,合計時間";
const ALL_DAY: &str = "終日";

/// A report ready to print.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedReport {
    /// A single JSON document.
    Json(Value),
    /// Lines of CSV or plain text.
    Lines(Vec<String>),
}

impl fmt::Display for RenderedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => {
                let text = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
                write!(f, "{text}")
            }
            Self::Lines(lines) => write!(f, "{}", lines.join("\n")),
        }
    }
}

/// Renders a report in the requested encoding.
pub fn render(report: &Report, format: OutputFormat) -> Result<RenderedReport, CoreError> {
    Ok(match (format, &report.summary) {
        (OutputFormat::Json, None) => RenderedReport::Json(events_json(report)?),
        (OutputFormat::Json, Some(summary)) => {
            RenderedReport::Json(summary_json(report, summary)?)
        }
        (OutputFormat::Csv, None) => RenderedReport::Lines(events_csv(report)),
        (OutputFormat::Csv, Some(summary)) => RenderedReport::Lines(summary_csv(report, summary)),
        (OutputFormat::Text, None) => RenderedReport::Lines(events_text(report)),
        (OutputFormat::Text, Some(summary)) => {
            RenderedReport::Lines(summary_text(report, summary))
        }
    })
}

// ========== JSON ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonPeriod {
    year: i32,
    month: u32,
    start_date: String,
    end_date: String,
}

impl From<&ReportPeriod> for JsonPeriod {
    fn from(period: &ReportPeriod) -> Self {
        Self {
            year: period.start.year(),
            month: period.start.month(),
            start_date: period.start.format("%Y-%m-%d").to_string(),
            end_date: period.end.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonEventList<'a> {
    #[serde(flatten)]
    period: JsonPeriod,
    total_events: usize,
    events: &'a [NormalizedEvent],
    #[serde(skip_serializing_if = "Option::is_none")]
    exclusion: Option<&'a Exclusion>,
    #[serde(skip_serializing_if = "is_zero")]
    skipped_events: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSummary<'a> {
    #[serde(flatten)]
    period: JsonPeriod,
    summary_type: Granularity,
    total_events: usize,
    total_minutes: i64,
    total_formatted: String,
    buckets: &'a [Bucket],
    #[serde(skip_serializing_if = "Option::is_none")]
    exclusion: Option<&'a Exclusion>,
    #[serde(skip_serializing_if = "is_zero")]
    skipped_events: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde skip_serializing_if signature
const fn is_zero(n: &usize) -> bool {
    *n == 0
}

fn events_json(report: &Report) -> Result<Value, CoreError> {
    let document = JsonEventList {
        period: JsonPeriod::from(&report.period),
        total_events: report.events.len(),
        events: &report.events,
        exclusion: report.exclusion.as_ref(),
        skipped_events: report.skipped,
        message: report.events.is_empty().then_some(NO_EVENTS),
    };
    Ok(serde_json::to_value(document)?)
}

fn summary_json(report: &Report, summary: &Summary) -> Result<Value, CoreError> {
    let document = JsonSummary {
        period: JsonPeriod::from(&report.period),
        summary_type: summary.granularity,
        total_events: summary.total_events,
        total_minutes: summary.total_minutes,
        total_formatted: format_minutes(summary.total_minutes),
        buckets: &summary.buckets,
        exclusion: report.exclusion.as_ref(),
        skipped_events: report.skipped,
        message: report.events.is_empty().then_some(NO_EVENTS),
    };
    Ok(serde_json::to_value(document)?)
}

// ========== CSV ==========

/// Quotes a free-text CSV field, doubling embedded quotes.
pub fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn csv_preamble(report: &Report) -> Vec<String> {
    let mut lines = vec![format!("期間,{}", report.period.message())];
    if let Some(exclusion) = &report.exclusion {
        lines.push(format!("除外,{}件", exclusion.excluded_count));
    }
    if report.skipped > 0 {
        lines.push(format!("スキップ,{}件", report.skipped));
    }
    lines
}

fn events_csv(report: &Report) -> Vec<String> {
    let mut lines = csv_preamble(report);
    if report.events.is_empty() {
        lines.push(NO_EVENTS.to_string());
        return lines;
    }

    lines.push(CSV_EVENT_HEADER.to_string());
    for event in &report.events {
        let date = event.local.start_date;
        lines.push(format!(
            "{}/{}/{},{},{},{},{},{},{}",
            date.year(),
            date.month(),
            date.day(),
            csv_quote(&time_cell(event.local.start_time, event.is_all_day)),
            csv_quote(&time_cell(event.local.end_time, event.is_all_day)),
            csv_quote(&event.duration.formatted),
            csv_quote(&event.summary),
            csv_quote(&event.location),
            csv_quote(&event.description),
        ));
    }
    lines
}

fn summary_csv(report: &Report, summary: &Summary) -> Vec<String> {
    let mut lines = csv_preamble(report);
    if report.events.is_empty() {
        lines.push(NO_EVENTS.to_string());
        return lines;
    }

    lines.push(CSV_SUMMARY_HEADER.to_string());
    for bucket in &summary.buckets {
        lines.push(format!(
            "{},{},{}",
            csv_quote(&bucket.label),
            bucket.event_count,
            csv_quote(&bucket.formatted)
        ));
    }
    lines.push(format!(
        "{},{},{}",
        csv_quote("合計"),
        summary.total_events,
        csv_quote(&format_minutes(summary.total_minutes))
    ));
    lines
}

fn time_cell(time: Option<NaiveTime>, is_all_day: bool) -> String {
    match time {
        _ if is_all_day => ALL_DAY.to_string(),
        Some(time) => format!("{}:{:02}", time.hour(), time.minute()),
        None => String::new(),
    }
}

// ========== Text ==========

fn text_preamble(report: &Report) -> Vec<String> {
    let mut lines = vec![report.period.message()];
    if let Some(exclusion) = &report.exclusion {
        lines.push(format!(
            "除外キーワード: {}（{}）により {}件の予定を除外しました",
            exclusion.keywords.join(", "),
            exclusion.mode,
            exclusion.excluded_count
        ));
    }
    if report.skipped > 0 {
        lines.push(format!("不正な予定 {}件をスキップしました", report.skipped));
    }
    lines
}

fn events_text(report: &Report) -> Vec<String> {
    let mut lines = text_preamble(report);
    if report.events.is_empty() {
        lines.push(NO_EVENTS.to_string());
        return lines;
    }

    lines.push(format!(
        "{}年{}月の予定:",
        report.period.start.year(),
        report.period.start.month()
    ));
    lines.extend(report.events.iter().map(|event| {
        format!(
            "{} - {} ({})",
            event.start.formatted_date, event.summary, event.duration.formatted
        )
    }));
    lines
}

fn summary_text(report: &Report, summary: &Summary) -> Vec<String> {
    let mut lines = text_preamble(report);
    if report.events.is_empty() {
        lines.push(NO_EVENTS.to_string());
        return lines;
    }

    lines.push(format!(
        "{}集計（全{}件、合計 {}）:",
        summary.granularity.title(),
        summary.total_events,
        format_minutes(summary.total_minutes)
    ));
    lines.extend(summary.buckets.iter().map(|bucket| {
        format!(
            "{}: {}（{}件）",
            bucket.label, bucket.formatted, bucket.event_count
        )
    }));
    lines
}
