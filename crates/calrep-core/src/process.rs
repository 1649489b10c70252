//! The report pipeline: normalize, filter, bucket, render.

use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::bucket::{Granularity, Summary, bucket};
use crate::error::CoreError;
use crate::event::{NormalizedEvent, RawEvent};
use crate::filter::filter;
use crate::normalize::normalize_all;
use crate::options::{ExcludeMode, ReportOptions, ReportPeriod};
use crate::render::{RenderedReport, render};

/// Exclusion settings and their effect, reported when keywords were given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exclusion {
    pub keywords: Vec<String>,
    pub mode: ExcludeMode,
    pub excluded_count: usize,
}

/// Everything a renderer needs, independent of output format.
#[derive(Debug, Clone)]
pub struct Report {
    pub period: ReportPeriod,
    /// Kept events in input order.
    pub events: Vec<NormalizedEvent>,
    pub exclusion: Option<Exclusion>,
    /// Events dropped because they could not be normalized.
    pub skipped: usize,
    pub summary: Option<Summary>,
}

/// Runs normalize, filter and (when requested) bucketing.
pub fn build_report<Tz: TimeZone>(
    raw_events: &[RawEvent],
    options: &ReportOptions,
    tz: &Tz,
) -> Report {
    let batch = normalize_all(raw_events, tz);
    let outcome = filter(batch.events, &options.exclude_keywords, options.exclude_mode);

    let exclusion = (!options.exclude_keywords.is_empty()).then(|| Exclusion {
        keywords: options.exclude_keywords.clone(),
        mode: options.exclude_mode,
        excluded_count: outcome.excluded_count,
    });

    let summary = Granularity::from_summary_mode(options.summary_mode)
        .map(|granularity| bucket(&outcome.kept, granularity));

    tracing::debug!(
        received = raw_events.len(),
        kept = outcome.kept.len(),
        excluded = outcome.excluded_count,
        skipped = batch.skipped,
        "built report"
    );

    Report {
        period: options.period,
        events: outcome.kept,
        exclusion,
        skipped: batch.skipped,
        summary,
    }
}

/// Produces the rendered report with local dates in `tz`.
pub fn process_in<Tz: TimeZone>(
    raw_events: &[RawEvent],
    options: &ReportOptions,
    tz: &Tz,
) -> Result<RenderedReport, CoreError> {
    let report = build_report(raw_events, options, tz);
    render(&report, options.output_format)
}

/// Produces the rendered report with local dates in the host's time zone.
pub fn process(
    raw_events: &[RawEvent],
    options: &ReportOptions,
) -> Result<RenderedReport, CoreError> {
    process_in(raw_events, options, &Local)
}
