// File: ./src/model/item.rs
use crate::model::guide::StudyGuide;
use crate::model::parser;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
pub enum EventType {
    Exam,
    Assignment,
    #[default]
    Revision,
}

impl EventType {
    /// Exam keywords win over assignment keywords; anything else is a revision.
    pub fn detect(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        if lower.contains("exam") || lower.contains("test") {
            Some(EventType::Exam)
        } else if lower.contains("assignment")
            || lower.contains("homework")
            || lower.contains("project")
        {
            Some(EventType::Assignment)
        } else {
            None
        }
    }

    pub fn detect_or_default(text: &str) -> Self {
        Self::detect(text).unwrap_or_default()
    }
}

/// An exam, assignment or revision target found in a study request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub subject: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub date: NaiveDate,
}

impl Event {
    pub fn new(subject: impl Into<String>, event_type: EventType, date: NaiveDate) -> Self {
        Self {
            subject: subject.into(),
            event_type,
            date,
        }
    }

    /// Used when nothing at all could be extracted. Stays on `today` at the
    /// end of the calendar.
    pub fn general_session(today: NaiveDate) -> Self {
        let date = parser::add_days(today, 1).unwrap_or(today);
        Self::new("General", EventType::Revision, date)
    }

    pub fn title(&self) -> String {
        match self.event_type {
            EventType::Exam => format!("{} Exam", self.subject),
            EventType::Assignment => format!("{} Assignment", self.subject),
            EventType::Revision => format!("{} Study Session", self.subject),
        }
    }
}

/// One day's row in a generated plan.
///
/// `notes` is either plain text or a serialized [`StudyGuide`]. `date`
/// serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub title: String,
    pub subject: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub notes: String,
}

impl PlanEntry {
    pub fn study_guide(&self) -> Option<StudyGuide> {
        if !self.notes.trim_start().starts_with('{') {
            return None;
        }
        StudyGuide::parse(&self.notes).ok()
    }

    /// Notes as readable text, with guides flattened into bullet lines.
    pub fn notes_text(&self) -> String {
        match self.study_guide() {
            Some(guide) => guide.to_plain_text(),
            None => self.notes.clone(),
        }
    }
}
