// File: ./src/planner.rs
//! Turns extracted events into a day-by-day study plan.
//!
//! Planning runs in two phases. [`synthesize`] is pure: it decides, for
//! every day from today to the last event, whether an entry is emitted and
//! what it is. [`Planner`] then fills in the notes, calling the text
//! generator for event days and intensive days and falling back to
//! templates when that fails.
use crate::client::TextGenerator;
use crate::enrich::{GuideSource, enrich};
use crate::model::extractor::{dedup_and_sort, extract_events};
use crate::model::guide::GuideTarget;
use crate::model::item::{Event, EventType, PlanEntry};
use chrono::{Days, NaiveDate};
use futures::stream::{self, StreamExt};

pub const INTENSIVE_MAX_DAYS: i64 = 3;
pub const MODERATE_MAX_DAYS: i64 = 7;
pub const DEFAULT_CONCURRENCY: usize = 4;
/// Days walked one by one. Events further out still get their own entry,
/// but the days leading up to them are not planned.
pub const MAX_PLAN_DAYS: i64 = 3660;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    EventDay,
    /// Next event is at most three days away.
    Intensive,
    /// Four to seven days away.
    Moderate,
    /// More than a week away; only every other day gets an entry.
    Light,
    /// Nothing left to prepare for; every third day.
    AfterEvents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotNote {
    Fixed(String),
    Guide {
        target: GuideTarget,
        days_until: i64,
    },
}

/// A planned entry whose notes have not been produced yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSlot {
    pub day: i64,
    pub date: NaiveDate,
    pub tier: Tier,
    pub title: String,
    pub subject: String,
    pub event_type: EventType,
    pub note: SlotNote,
}

fn target_for(event: &Event) -> GuideTarget {
    GuideTarget {
        title: event.title(),
        subject: event.subject.clone(),
        event_type: event.event_type,
        date: event.date,
    }
}

/// Number of days covered after today; the plan spans `0..=total_days(..)`.
pub fn total_days(events: &[Event], today: NaiveDate) -> i64 {
    events
        .iter()
        .map(|e| (e.date - today).num_days())
        .max()
        .unwrap_or(0)
        .max(0)
}

fn event_slot(day: i64, event: &Event) -> PlanSlot {
    PlanSlot {
        day,
        date: event.date,
        tier: Tier::EventDay,
        title: event.title(),
        subject: event.subject.clone(),
        event_type: event.event_type,
        note: SlotNote::Guide {
            target: target_for(event),
            days_until: 0,
        },
    }
}

/// Lays out the plan. Output is ordered by date and never extends past the
/// latest event. Only the first [`MAX_PLAN_DAYS`] days are walked.
pub fn synthesize(events: &[Event], today: NaiveDate) -> Vec<PlanSlot> {
    let mut slots = Vec::new();
    let total = total_days(events, today);
    let horizon = total.min(MAX_PLAN_DAYS);
    if total > horizon {
        log::warn!(
            "Last event is {} days away; planning daily sessions for the first {} only",
            total,
            horizon
        );
    }

    for day in 0..=horizon {
        let Some(date) = today.checked_add_days(Days::new(day as u64)) else {
            break;
        };

        let mut on_this_day = events.iter().filter(|e| e.date == date).peekable();
        if on_this_day.peek().is_some() {
            slots.extend(on_this_day.map(|event| event_slot(day, event)));
            continue;
        }

        let next_event = events
            .iter()
            .filter(|e| e.date > date)
            .min_by_key(|e| e.date);

        let Some(next) = next_event else {
            if day % 3 == 0 {
                slots.push(PlanSlot {
                    day,
                    date,
                    tier: Tier::AfterEvents,
                    title: "General Review Session".to_string(),
                    subject: "General".to_string(),
                    event_type: EventType::Revision,
                    note: SlotNote::Fixed(
                        "Go back over what you've covered so far and note anything that still feels unclear"
                            .to_string(),
                    ),
                });
            }
            continue;
        };

        let days_until = (next.date - date).num_days();
        let subject = next.subject.clone();

        if days_until <= INTENSIVE_MAX_DAYS {
            slots.push(PlanSlot {
                day,
                date,
                tier: Tier::Intensive,
                title: format!("{} Intensive Review", subject),
                subject,
                event_type: EventType::Revision,
                note: SlotNote::Guide {
                    target: target_for(next),
                    days_until,
                },
            });
        } else if days_until <= MODERATE_MAX_DAYS {
            slots.push(PlanSlot {
                day,
                date,
                tier: Tier::Moderate,
                title: format!("{} Study Session", subject),
                note: SlotNote::Fixed(format!(
                    "Review {} concepts and practice problems",
                    subject
                )),
                subject,
                event_type: EventType::Revision,
            });
        } else if day % 2 == 0 {
            slots.push(PlanSlot {
                day,
                date,
                tier: Tier::Light,
                title: format!("{} Preparation", subject),
                note: SlotNote::Fixed(format!(
                    "Light preparation for the {}: skim your {} notes ({} days to go)",
                    next.title(),
                    subject,
                    days_until
                )),
                subject,
                event_type: EventType::Revision,
            });
        }
    }

    let mut beyond: Vec<(i64, &Event)> = events
        .iter()
        .map(|e| ((e.date - today).num_days(), e))
        .filter(|(day, _)| *day > horizon)
        .collect();
    beyond.sort_by_key(|(day, _)| *day);
    slots.extend(beyond.into_iter().map(|(day, event)| event_slot(day, event)));
    slots
}

/// Builds plans, optionally enriching them through a text generator.
pub struct Planner<'g> {
    generator: Option<&'g dyn TextGenerator>,
    concurrency: usize,
    grade: Option<String>,
}

impl<'g> Planner<'g> {
    pub fn new(generator: Option<&'g dyn TextGenerator>) -> Self {
        Self {
            generator,
            concurrency: DEFAULT_CONCURRENCY,
            grade: None,
        }
    }

    /// Template guides only, no network.
    pub fn offline() -> Self {
        Self::new(None)
    }

    /// How many guide requests may be in flight at once. Output order does
    /// not depend on this.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_grade(mut self, grade: Option<&str>) -> Self {
        self.grade = grade.map(str::to_string);
        self
    }

    pub async fn plan(&self, request: &str, today: NaiveDate) -> Vec<PlanEntry> {
        let events = extract_events(request, today);
        log::info!(
            "Extracted {} event(s) from request: {}",
            events.len(),
            events
                .iter()
                .map(|e| format!("{} on {}", e.title(), e.date))
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.plan_events(&events, today).await
    }

    /// Plans around caller-supplied events. An empty list becomes a single
    /// general study session tomorrow.
    pub async fn plan_events(&self, events: &[Event], today: NaiveDate) -> Vec<PlanEntry> {
        let events = if events.is_empty() {
            vec![Event::general_session(today)]
        } else {
            dedup_and_sort(events.to_vec())
        };

        let slots = synthesize(&events, today);
        let results: Vec<(PlanEntry, Option<GuideSource>)> = stream::iter(slots)
            .map(|slot| self.realize(slot))
            .buffered(self.concurrency)
            .collect()
            .await;

        let generated = results
            .iter()
            .filter(|(_, s)| *s == Some(GuideSource::Generated))
            .count();
        let templated = results
            .iter()
            .filter(|(_, s)| *s == Some(GuideSource::Template))
            .count();
        log::info!(
            "Plan ready: {} entries, {} generated guide(s), {} template guide(s)",
            results.len(),
            generated,
            templated
        );

        results.into_iter().map(|(entry, _)| entry).collect()
    }

    async fn realize(&self, slot: PlanSlot) -> (PlanEntry, Option<GuideSource>) {
        let (notes, source) = match slot.note {
            SlotNote::Fixed(text) => (text, None),
            SlotNote::Guide { target, days_until } => {
                let (guide, source) =
                    enrich(self.generator, &target, days_until, self.grade.as_deref()).await;
                (guide.to_json(), Some(source))
            }
        };
        let entry = PlanEntry {
            title: slot.title,
            subject: slot.subject,
            date: slot.date,
            event_type: slot.event_type,
            notes,
        };
        (entry, source)
    }
}
