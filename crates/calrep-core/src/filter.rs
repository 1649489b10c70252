//! Keyword-based exclusion of normalized events.

use crate::event::NormalizedEvent;
use crate::matcher::CompiledKeyword;
use crate::options::ExcludeMode;

/// Events that survived filtering and how many were dropped.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub kept: Vec<NormalizedEvent>,
    pub excluded_count: usize,
}

/// Drops every event whose summary, description or location matches any keyword.
///
/// With no keywords all events are kept. Kept events retain their order.
pub fn filter(
    events: Vec<NormalizedEvent>,
    keywords: &[String],
    mode: ExcludeMode,
) -> FilterOutcome {
    if keywords.is_empty() {
        return FilterOutcome {
            kept: events,
            excluded_count: 0,
        };
    }

    let compiled: Vec<CompiledKeyword> = keywords
        .iter()
        .map(|keyword| CompiledKeyword::new(keyword, mode))
        .collect();

    let mut outcome = FilterOutcome::default();
    for event in events {
        if let Some(keyword) = first_match(&event, &compiled) {
            tracing::debug!(summary = %event.summary, keyword, %mode, "excluding event");
            outcome.excluded_count += 1;
        } else {
            outcome.kept.push(event);
        }
    }
    outcome
}

fn first_match<'a>(event: &NormalizedEvent, keywords: &'a [CompiledKeyword]) -> Option<&'a str> {
    let fields = [
        event.summary.as_str(),
        event.description.as_str(),
        event.location.as_str(),
    ];
    keywords
        .iter()
        .find(|keyword| fields.iter().any(|field| keyword.matches(field)))
        .map(CompiledKeyword::keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventMarker, RawEvent};
    use crate::normalize::normalize;
    use chrono::Utc;

    fn event(summary: &str, description: &str, location: &str) -> NormalizedEvent {
        let raw = RawEvent {
            summary: Some(summary.to_string()),
            description: Some(description.to_string()),
            location: Some(location.to_string()),
            start: EventMarker::date("2025-05-01"),
            end: EventMarker::date("2025-05-02"),
            ..RawEvent::default()
        };
        normalize(&raw, &Utc).unwrap()
    }

    fn summaries(outcome: &FilterOutcome) -> Vec<&str> {
        outcome.kept.iter().map(|e| e.summary.as_str()).collect()
    }

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn no_keywords_keeps_everything() {
        let events = vec![event("A", "", ""), event("B", "", "")];
        let outcome = filter(events, &[], ExcludeMode::Contains);

        assert_eq!(summaries(&outcome), ["A", "B"]);
        assert_eq!(outcome.excluded_count, 0);
    }

    #[test]
    fn any_field_can_trigger_exclusion() {
        let events = vec![
            event("移動", "", ""),
            event("Review", "社内ランチ", ""),
            event("Review", "", "ランチ会場"),
            event("Design review", "", "Room 4"),
        ];
        let outcome = filter(events, &keywords(&["移動", "ランチ"]), ExcludeMode::Contains);

        assert_eq!(summaries(&outcome), ["Design review"]);
        assert_eq!(outcome.excluded_count, 3);
    }

    #[test]
    fn contains_excludes_iff_some_keyword_is_a_substring() {
        let samples = [
            ("Lunch", "", "", true),
            ("lunch", "", "", false),
            ("Team", "after Lunch", "", true),
            ("Team", "", "Lunchroom", true),
            ("Team", "", "", false),
        ];
        for (summary, description, location, excluded) in samples {
            let outcome = filter(
                vec![event(summary, description, location)],
                &keywords(&["Lunch", "Dinner"]),
                ExcludeMode::Contains,
            );
            assert_eq!(
                outcome.excluded_count == 1,
                excluded,
                "{summary}/{description}/{location}"
            );
        }
    }

    #[test]
    fn invalid_regex_excludes_nothing() {
        let events = vec![event("(", "(", "("), event("B", "", "")];
        let outcome = filter(events, &keywords(&["("]), ExcludeMode::Regex);

        assert_eq!(outcome.excluded_count, 0);
        assert_eq!(outcome.kept.len(), 2);
    }

    #[test]
    fn one_bad_regex_does_not_disable_the_others() {
        let events = vec![event("Sprint review", "", ""), event("Planning", "", "")];
        let outcome = filter(events, &keywords(&["(", "^sprint"]), ExcludeMode::Regex);

        assert_eq!(summaries(&outcome), ["Planning"]);
    }
}
