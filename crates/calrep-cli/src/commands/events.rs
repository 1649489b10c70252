//! Events command: fetch a date range and print the report.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use calrep_core::duration::local_midnight_to_utc;
use calrep_core::{RawEvent, ReportOptions, ReportPeriod};
use calrep_gcal::{AccessToken, Client};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Deserialize;

use crate::{Config, EventsArgs};

/// Raw events read from a file: a bare array or an `events.list` response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventsInput {
    List(Vec<RawEvent>),
    Page {
        #[serde(default)]
        items: Vec<RawEvent>,
    },
}

/// Runs the events command, writing the rendered report to `writer`.
pub fn run<W: Write>(writer: &mut W, args: &EventsArgs, config: &Config) -> Result<()> {
    let today = Local::now().date_naive();
    let options = resolve_options(args, config, today)?;
    tracing::debug!(?options, "resolved report options");

    let raw_events = match &args.input {
        Some(path) => read_events(path)?,
        None => fetch_events(args, config, options.period)?,
    };

    let rendered =
        calrep_core::process(&raw_events, &options).context("failed to render report")?;
    writeln!(writer, "{rendered}")?;
    Ok(())
}

/// Merges command-line flags over configuration.
///
/// Configured keywords apply only when no `--exclude` was given.
pub fn resolve_options(
    args: &EventsArgs,
    config: &Config,
    today: NaiveDate,
) -> Result<ReportOptions> {
    let period = resolve_period(args.start, args.end, today)?;
    let exclude_keywords = if args.exclude.is_empty() {
        config.exclude_keywords.clone()
    } else {
        args.exclude.clone()
    };

    Ok(ReportOptions {
        period,
        exclude_keywords,
        exclude_mode: args.exclude_mode.unwrap_or(config.exclude_mode),
        summary_mode: args.summary,
        output_format: args.format,
    })
}

/// Picks the inclusive date range to report on.
///
/// A missing bound is filled in from the month of the other one, or from
/// the current month when both are missing.
fn resolve_period(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<ReportPeriod> {
    let period = match (start, end) {
        (Some(start), Some(end)) => ReportPeriod::new(start, end),
        (Some(start), None) => ReportPeriod::new(start, ReportPeriod::month_of(start).end),
        (None, Some(end)) => ReportPeriod::new(ReportPeriod::month_of(end).start, end),
        (None, None) => ReportPeriod::month_of(today),
    };
    if period.start > period.end {
        bail!("start date {} is after end date {}", period.start, period.end);
    }
    Ok(period)
}

fn read_events(path: &Path) -> Result<Vec<RawEvent>> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read events from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    parse_events(&contents).with_context(|| format!("invalid events in {}", path.display()))
}

fn parse_events(contents: &str) -> Result<Vec<RawEvent>> {
    let input: EventsInput = serde_json::from_str(contents)?;
    Ok(match input {
        EventsInput::List(events) | EventsInput::Page { items: events } => events,
    })
}

fn fetch_events(
    args: &EventsArgs,
    config: &Config,
    period: ReportPeriod,
) -> Result<Vec<RawEvent>> {
    let token = AccessToken::load(&config.token_path).context("failed to load access token")?;
    let client = Client::new(token)
        .context("failed to create Google Calendar client")?
        .with_base_url(config.api_base_url.clone());

    let calendar_id = args.calendar.as_deref().unwrap_or(&config.calendar_id);
    let (time_min, time_max) = fetch_window(period, &Local)?;
    tracing::debug!(calendar_id, %time_min, %time_max, "fetching events");

    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let events = runtime
        .block_on(client.list_events(calendar_id, time_min, time_max))
        .with_context(|| format!("failed to fetch events from calendar {calendar_id}"))?;
    tracing::debug!(count = events.len(), "fetched events");
    Ok(events)
}

/// Instants from local midnight of the first day to local midnight after the last.
fn fetch_window<Tz: chrono::TimeZone>(
    period: ReportPeriod,
    tz: &Tz,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let after_end = period
        .end
        .succ_opt()
        .with_context(|| format!("end date {} is out of range", period.end))?;
    Ok((
        local_midnight_to_utc(period.start, tz),
        local_midnight_to_utc(after_end, tz),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calrep_core::{ExcludeMode, OutputFormat, SummaryMode};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn period_defaults_to_current_month() {
        let period = resolve_period(None, None, date(2025, 2, 14)).unwrap();
        assert_eq!(period, ReportPeriod::new(date(2025, 2, 1), date(2025, 2, 28)));
    }

    #[test]
    fn period_fills_missing_bound_from_other_month() {
        let period = resolve_period(Some(date(2025, 5, 10)), None, date(2025, 1, 1)).unwrap();
        assert_eq!(period, ReportPeriod::new(date(2025, 5, 10), date(2025, 5, 31)));

        let period = resolve_period(None, Some(date(2025, 6, 20)), date(2025, 1, 1)).unwrap();
        assert_eq!(period, ReportPeriod::new(date(2025, 6, 1), date(2025, 6, 20)));
    }

    #[test]
    fn period_rejects_reversed_range() {
        let err = resolve_period(Some(date(2025, 5, 2)), Some(date(2025, 5, 1)), date(2025, 1, 1))
            .unwrap_err();
        assert!(err.to_string().contains("after end date"));
    }

    #[test]
    fn fetch_window_spans_whole_local_days() {
        let jst = chrono::FixedOffset::east_opt(9 * 3600).unwrap();
        let period = ReportPeriod::new(date(2025, 5, 1), date(2025, 5, 31));

        let (time_min, time_max) = fetch_window(period, &jst).unwrap();

        assert_eq!(time_min.to_rfc3339(), "2025-04-30T15:00:00+00:00");
        assert_eq!(time_max.to_rfc3339(), "2025-05-31T15:00:00+00:00");
    }

    #[test]
    fn fetch_window_rejects_last_representable_day() {
        let period = ReportPeriod::new(date(2025, 5, 1), NaiveDate::MAX);
        let err = fetch_window(period, &Utc).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn flags_override_config() {
        let config = Config {
            exclude_keywords: vec!["移動".to_string()],
            exclude_mode: ExcludeMode::Word,
            ..Config::default()
        };
        let args = EventsArgs {
            exclude: vec!["ランチ".to_string()],
            exclude_mode: Some(ExcludeMode::Regex),
            format: OutputFormat::Text,
            summary: SummaryMode::Monthly,
            ..EventsArgs::default()
        };

        let options = resolve_options(&args, &config, date(2025, 5, 1)).unwrap();

        assert_eq!(options.exclude_keywords, ["ランチ"]);
        assert_eq!(options.exclude_mode, ExcludeMode::Regex);
        assert_eq!(options.output_format, OutputFormat::Text);
        assert_eq!(options.summary_mode, SummaryMode::Monthly);
    }

    #[test]
    fn config_keywords_apply_without_flags() {
        let config = Config {
            exclude_keywords: vec!["移動".to_string()],
            exclude_mode: ExcludeMode::Word,
            ..Config::default()
        };
        let options = resolve_options(&EventsArgs::default(), &config, date(2025, 5, 1)).unwrap();

        assert_eq!(options.exclude_keywords, ["移動"]);
        assert_eq!(options.exclude_mode, ExcludeMode::Word);
    }

    #[test]
    fn parse_events_accepts_array_and_page() {
        let array = r#"[{"summary": "A", "start": {"date": "2025-05-01"}, "end": {"date": "2025-05-02"}}]"#;
        assert_eq!(parse_events(array).unwrap().len(), 1);

        let page = r#"{"kind": "calendar#events", "items": [{"summary": "A"}, {"summary": "B"}]}"#;
        assert_eq!(parse_events(page).unwrap().len(), 2);

        assert!(parse_events("42").is_err());
    }

    #[test]
    fn run_writes_report_for_input_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("events.json");
        std::fs::write(
            &path,
            r#"[{"summary": "Holiday", "start": {"date": "2025-05-05"}, "end": {"date": "2025-05-06"}}]"#,
        )
        .unwrap();
        let args = EventsArgs {
            start: Some(date(2025, 5, 1)),
            end: Some(date(2025, 5, 31)),
            format: OutputFormat::Text,
            input: Some(path),
            ..EventsArgs::default()
        };

        let mut output = Vec::new();
        run(&mut output, &args, &Config::default()).unwrap();

        insta::assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        2025年5月1日から2025年5月31日までの予定を取得します
        2025年5月の予定:
        5月5日（終日） - Holiday (終日)
        ");
    }

    #[test]
    fn run_without_token_fails_with_context() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            token_path: temp.path().join("tokens.json"),
            ..Config::default()
        };
        let err = run(&mut Vec::new(), &EventsArgs::default(), &config).unwrap_err();
        assert!(err.to_string().contains("failed to load access token"));
    }
}
