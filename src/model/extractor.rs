// File: ./src/model/extractor.rs
//! Pulls exam/assignment/revision events out of a free-text study request.
use crate::model::item::{Event, EventType};
use crate::model::parser::{self, days_pattern};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Keyword -> subject. Several keywords can share a subject; duplicate
/// events they produce are collapsed afterwards.
pub const SUBJECT_VOCABULARY: &[(&str, &str)] = &[
    ("mathematics", "Mathematics"),
    ("maths", "Mathematics"),
    ("math", "Mathematics"),
    ("physics", "Physics"),
    ("chemistry", "Chemistry"),
    ("biology", "Biology"),
    ("english", "English"),
    ("history", "History"),
    ("geography", "Geography"),
    ("aptitude", "Aptitude"),
];

/// First-match order for the single inferred event.
const FALLBACK_PRIORITY: &[(&[&str], &str)] = &[
    (&["physics"], "Physics"),
    (&["chemistry"], "Chemistry"),
    (&["biology"], "Biology"),
    (&["english"], "English"),
    (&["history"], "History"),
    (&["math", "mathematics"], "Mathematics"),
    (&["aptitude"], "Aptitude"),
];

pub const DEFAULT_SUBJECT: &str = "Mathematics";

struct SubjectPattern {
    keyword: &'static str,
    subject: &'static str,
    // group 1: amount of the first day phrase after the keyword
    local: Regex,
}

static SUBJECT_PATTERNS: Lazy<Vec<SubjectPattern>> = Lazy::new(|| {
    SUBJECT_VOCABULARY
        .iter()
        .map(|&(keyword, subject)| {
            let src = format!(r"(?s){}.*?{}", regex::escape(keyword), days_pattern());
            SubjectPattern {
                keyword,
                subject,
                local: Regex::new(&src).expect("subject pattern is valid"),
            }
        })
        .collect()
});

/// Extracts events from `request`. The result is never empty, is free of
/// duplicates and is sorted by date.
pub fn extract_events(request: &str, today: NaiveDate) -> Vec<Event> {
    let lower = request.to_lowercase();
    let mut events = scan_vocabulary(&lower, today);
    if events.is_empty() {
        let inferred = infer_single_event(&lower, today);
        log::debug!(
            "No dated subject mentions, inferred {} {} on {}",
            inferred.subject,
            inferred.event_type,
            inferred.date
        );
        events.push(inferred);
    }
    dedup_and_sort(events)
}

/// Text from the first mention of `keyword` up to the next mention of a
/// different subject, or the end of the request.
fn subject_segment<'a>(lower: &'a str, keyword: &str, subject: &str) -> Option<&'a str> {
    let start = lower.find(keyword)?;
    let after = start + keyword.len();
    let end = SUBJECT_VOCABULARY
        .iter()
        .filter(|(_, other)| *other != subject)
        .filter_map(|(other_keyword, _)| lower[after..].find(other_keyword).map(|i| after + i))
        .min()
        .unwrap_or(lower.len());
    Some(&lower[start..end])
}

/// One event per vocabulary keyword that has a date phrase after it, or
/// anywhere in the request. Keywords without any date phrase are dropped.
///
/// The type comes from the subject's own segment of the request (exam
/// still beats assignment there), else from the whole request.
pub fn scan_vocabulary(lower: &str, today: NaiveDate) -> Vec<Event> {
    let mut events = Vec::new();
    let request_type = EventType::detect_or_default(lower);

    for pattern in SUBJECT_PATTERNS.iter() {
        if !lower.contains(pattern.keyword) {
            continue;
        }

        let event_type = subject_segment(lower, pattern.keyword, pattern.subject)
            .and_then(EventType::detect)
            .unwrap_or(request_type);

        let local = pattern
            .local
            .captures(lower)
            .and_then(|caps| caps.get(1))
            .and_then(|m| parser::parse_english_number(m.as_str()));
        let Some(amount) = local.or_else(|| parser::first_days_phrase(lower)) else {
            log::debug!(
                "Dropping '{}': no 'after/in N days' phrase in request",
                pattern.keyword
            );
            continue;
        };

        match parser::add_days(today, amount) {
            Some(date) => events.push(Event::new(pattern.subject, event_type, date)),
            None => log::debug!("Dropping '{}': offset {} out of range", pattern.keyword, amount),
        }
    }
    events
}

/// Best single guess for a vague request.
pub fn infer_single_event(lower: &str, today: NaiveDate) -> Event {
    let subject = FALLBACK_PRIORITY
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, subject)| *subject)
        .unwrap_or(DEFAULT_SUBJECT);

    Event::new(
        subject,
        EventType::detect_or_default(lower),
        parser::parse_date_phrase(lower, today),
    )
}

pub fn dedup_and_sort(events: Vec<Event>) -> Vec<Event> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Event> = events
        .into_iter()
        .filter(|e| seen.insert((e.subject.clone(), e.event_type, e.date)))
        .collect();
    // Stable: same-day events keep vocabulary order.
    unique.sort_by_key(|e| e.date);
    unique
}
