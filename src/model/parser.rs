// File: ./src/model/parser.rs
//! Relative date phrases ("after 3 days", "tomorrow", "next week").
//!
//! Phrases are resolved through one ordered table. The first rule whose
//! pattern matches anywhere in the text decides the offset; text with no
//! recognised phrase resolves to [`DEFAULT_OFFSET_DAYS`].
use chrono::{Days, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const DEFAULT_OFFSET_DAYS: u64 = 1;

const NUMBER_WORDS: &str = "one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve";

/// Source of the "after/in N days" pattern. Capture group 1 is the amount.
pub(crate) fn days_pattern() -> String {
    format!(r"\b(?:after|in)\s+(\d+|{NUMBER_WORDS})\s+days?\b")
}

pub static DAYS_PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&days_pattern()).expect("days phrase pattern is valid"));

pub struct PhraseRule {
    pub name: &'static str,
    pattern: Regex,
    offset: fn(&Captures) -> Option<u64>,
}

impl PhraseRule {
    fn new(name: &'static str, pattern: &str, offset: fn(&Captures) -> Option<u64>) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("phrase table pattern is valid"),
            offset,
        }
    }

    pub fn apply(&self, text: &str) -> Option<u64> {
        let caps = self.pattern.captures(text)?;
        (self.offset)(&caps)
    }
}

/// Priority order matters: the numeric day rule runs first, so "in 7 days"
/// and "in 14 days" never reach the week rules.
pub static PHRASE_TABLE: Lazy<Vec<PhraseRule>> = Lazy::new(|| {
    vec![
        PhraseRule::new("relative-days", &days_pattern(), amount_from),
        PhraseRule::new("tomorrow", r"\btomorrow\b", |_| Some(1)),
        PhraseRule::new("next-week", r"\bnext\s+week\b", |_| Some(7)),
        PhraseRule::new(
            "relative-weeks",
            &format!(r"\b(?:after|in)\s+(\d+|{NUMBER_WORDS})\s+weeks?\b"),
            |caps| amount_from(caps)?.checked_mul(7),
        ),
    ]
});

fn amount_from(caps: &Captures) -> Option<u64> {
    caps.get(1).and_then(|m| parse_english_number(m.as_str()))
}

pub fn parse_english_number(s: &str) -> Option<u64> {
    match s.to_lowercase().as_str() {
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        "eleven" => Some(11),
        "twelve" => Some(12),
        _ => s.parse::<u64>().ok(),
    }
}

/// Amount of the first "after/in N days" phrase in `text`.
pub fn first_days_phrase(text: &str) -> Option<u64> {
    DAYS_PHRASE.captures(text).and_then(|caps| amount_from(&caps))
}

/// Returns the name of the matching rule along with its offset.
pub fn match_phrase(text: &str) -> Option<(&'static str, u64)> {
    let lower = text.to_lowercase();
    PHRASE_TABLE
        .iter()
        .find_map(|rule| rule.apply(&lower).map(|days| (rule.name, days)))
}

pub fn resolve_offset(text: &str) -> u64 {
    match_phrase(text)
        .map(|(_, days)| days)
        .unwrap_or(DEFAULT_OFFSET_DAYS)
}

/// `None` only when the offset runs past the end of the calendar.
pub fn add_days(reference: NaiveDate, days: u64) -> Option<NaiveDate> {
    reference.checked_add_days(Days::new(days))
}

/// Resolves `text` to a date on or after `reference`. Never fails: an
/// unrecognised phrase, or one too large to represent, gives the default.
pub fn parse_date_phrase(text: &str, reference: NaiveDate) -> NaiveDate {
    let offset = resolve_offset(text);
    add_days(reference, offset)
        .or_else(|| add_days(reference, DEFAULT_OFFSET_DAYS))
        .unwrap_or(reference)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
