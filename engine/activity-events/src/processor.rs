//! Windowing, deduplication and interval statistics over event collections

use crate::models::{Event, EventId};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};

/// Keep events from the last `days` days, at most `max_count` of them.
///
/// The cap counts accepted events in input order, so the result is the most
/// recent `max_count` only when the input is sorted newest-first.
pub fn filter_recent(
    events: impl IntoIterator<Item = Event>,
    days: i64,
    max_count: usize,
) -> Vec<Event> {
    filter_recent_at(events, days, max_count, Utc::now())
}

/// [`filter_recent`] against an explicit reference instant
pub fn filter_recent_at(
    events: impl IntoIterator<Item = Event>,
    days: i64,
    max_count: usize,
    now: DateTime<Utc>,
) -> Vec<Event> {
    let cutoff = window_cutoff(now, days);
    let mut recent = Vec::new();

    for event in events {
        if recent.len() >= max_count {
            break;
        }
        if event.created_at >= cutoff {
            recent.push(event);
        }
    }

    recent
}

fn window_cutoff(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days).and_then(|window| now.checked_sub_signed(window)).unwrap_or(
        if days < 0 { DateTime::<Utc>::MAX_UTC } else { DateTime::<Utc>::MIN_UTC },
    )
}

/// Union of two collections keyed by event id.
///
/// Later occurrences replace earlier ones, so `incoming` wins over `existing`.
/// A replaced event keeps the position of the first occurrence.
pub fn deduplicate(existing: Vec<Event>, incoming: Vec<Event>) -> Vec<Event> {
    let mut positions: HashMap<EventId, usize> =
        HashMap::with_capacity(existing.len() + incoming.len());
    let mut merged: Vec<Event> = Vec::with_capacity(existing.len() + incoming.len());

    for event in existing.into_iter().chain(incoming) {
        match positions.get(&event.id) {
            Some(&position) => merged[position] = event,
            None => {
                positions.insert(event.id.clone(), merged.len());
                merged.push(event);
            }
        }
    }

    merged
}

/// Mean seconds between consecutive events of each (type, repository) group.
///
/// Groups with a single event report `0.0`.
pub fn average_interval(events: &[Event]) -> BTreeMap<String, f64> {
    let mut groups: HashMap<(&str, &str), Vec<DateTime<Utc>>> = HashMap::new();
    for event in events {
        groups
            .entry((event.event_type.as_str(), event.repo_name()))
            .or_default()
            .push(event.created_at);
    }

    groups
        .into_iter()
        .map(|((event_type, repo_name), mut timestamps)| {
            timestamps.sort();
            let gaps: Vec<f64> = timestamps
                .windows(2)
                .map(|pair| (pair[1] - pair[0]).num_milliseconds() as f64 / 1000.0)
                .collect();
            let average =
                if gaps.is_empty() { 0.0 } else { gaps.iter().sum::<f64>() / gaps.len() as f64 };

            (format!("{event_type} - {repo_name}"), average)
        })
        .collect()
}

/// Events strictly newer than `since`
pub fn newer_than(events: impl IntoIterator<Item = Event>, since: DateTime<Utc>) -> Vec<Event> {
    events.into_iter().filter(|event| event.created_at > since).collect()
}

/// Most recent `created_at` in the collection
pub fn latest_timestamp(events: &[Event]) -> Option<DateTime<Utc>> {
    events.iter().map(|event| event.created_at).max()
}
