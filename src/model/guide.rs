// File: ./src/model/guide.rs
//! Study guides attached to intensive and event-day plan entries.
//!
//! A guide either comes back from the generative text service (and must
//! survive [`StudyGuide::parse`]) or is built from fixed templates by
//! [`StudyGuide::fallback`], which cannot fail.
use crate::model::item::EventType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyGuide {
    pub how_to_complete: Vec<String>,
    pub guides: Vec<String>,
    pub suggestions: String,
    pub motivation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuideError {
    NotJson(String),
    NotAnObject,
    MissingField(&'static str),
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    Empty(&'static str),
}

impl fmt::Display for GuideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuideError::NotJson(e) => write!(f, "response is not valid JSON: {}", e),
            GuideError::NotAnObject => write!(f, "response is not a JSON object"),
            GuideError::MissingField(field) => write!(f, "missing field '{}'", field),
            GuideError::WrongType { field, expected } => {
                write!(f, "field '{}' must be {}", field, expected)
            }
            GuideError::Empty(field) => write!(f, "field '{}' is empty", field),
        }
    }
}

impl std::error::Error for GuideError {}

/// The event a guide is written for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideTarget {
    pub title: String,
    pub subject: String,
    pub event_type: EventType,
    pub date: NaiveDate,
}

/// Removes a surrounding Markdown code fence (```json ... ```), if any.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn string_list(obj: &Map<String, Value>, field: &'static str) -> Result<Vec<String>, GuideError> {
    let value = obj.get(field).ok_or(GuideError::MissingField(field))?;
    let wrong = GuideError::WrongType {
        field,
        expected: "an array of strings",
    };
    let items = value.as_array().ok_or_else(|| wrong.clone())?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let s = item.as_str().ok_or_else(|| wrong.clone())?.trim();
        if s.is_empty() {
            return Err(GuideError::Empty(field));
        }
        out.push(s.to_string());
    }
    if out.is_empty() {
        return Err(GuideError::Empty(field));
    }
    Ok(out)
}

impl StudyGuide {
    /// Strict parse of a raw service response, fenced or not.
    pub fn parse(raw: &str) -> Result<Self, GuideError> {
        let body = strip_code_fences(raw);
        let value: Value =
            serde_json::from_str(body).map_err(|e| GuideError::NotJson(e.to_string()))?;
        let obj = value.as_object().ok_or(GuideError::NotAnObject)?;

        let how_to_complete = string_list(obj, "howToComplete")?;
        let guides = string_list(obj, "guides")?;
        let suggestions = obj
            .get("suggestions")
            .ok_or(GuideError::MissingField("suggestions"))?
            .as_str()
            .ok_or(GuideError::WrongType {
                field: "suggestions",
                expected: "a string",
            })?
            .trim()
            .to_string();
        if suggestions.is_empty() {
            return Err(GuideError::Empty("suggestions"));
        }
        let motivation = string_list(obj, "motivation")?;

        Ok(Self {
            how_to_complete,
            guides,
            suggestions,
            motivation,
        })
    }

    pub fn to_json(&self) -> String {
        // A struct of strings always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn to_plain_text(&self) -> String {
        let mut out = String::from("How to complete:\n");
        for (i, step) in self.how_to_complete.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, step));
        }
        out.push_str("Tips:\n");
        for tip in &self.guides {
            out.push_str(&format!("  - {}\n", tip));
        }
        out.push_str(&format!("Suggestion: {}\n", self.suggestions));
        out.push_str("Motivation:\n");
        for line in &self.motivation {
            out.push_str(&format!("  - {}\n", line));
        }
        out
    }

    /// Template guide keyed by event type and whether the event is ahead,
    /// today, or already past.
    pub fn fallback(event_type: EventType, subject: &str, days_until: i64) -> Self {
        let when = match days_until {
            d if d > 0 => Timing::Upcoming(d),
            0 => Timing::Today,
            _ => Timing::Past,
        };
        match event_type {
            EventType::Exam => exam_guide(subject, when),
            EventType::Assignment => assignment_guide(subject, when),
            EventType::Revision => revision_guide(subject, when),
        }
    }
}

#[derive(Clone, Copy)]
enum Timing {
    Upcoming(i64),
    Today,
    Past,
}

fn days_label(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", days)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn exam_guide(subject: &str, when: Timing) -> StudyGuide {
    match when {
        Timing::Upcoming(days) => StudyGuide {
            how_to_complete: vec![
                format!("List every {} topic on the syllabus and mark the ones you feel shaky on", subject),
                "Work through past papers or practice questions with a timer running".to_string(),
                "Go back over every mistake and write down the rule or fact you missed".to_string(),
                "Finish with a short recap of your summary notes".to_string(),
            ],
            guides: strings(&[
                "Study in 25 to 40 minute blocks with short breaks in between",
                "Explain a hard idea out loud as if you were teaching a friend",
                "Start with the topics that carry the most marks",
            ]),
            suggestions: format!(
                "Your {} exam is in {}. Spend most of today on weak spots and keep the last evening light.",
                subject,
                days_label(days)
            ),
            motivation: strings(&[
                "Every question you practise now is one less surprise on the day.",
                "You don't need to be perfect, just a bit better than yesterday.",
                "Steady work beats a last-minute panic every time.",
            ]),
        },
        Timing::Today => StudyGuide {
            how_to_complete: vec![
                format!("Skim your {} summary sheet once and don't start anything new", subject),
                "Pack what you need the night before or first thing in the morning".to_string(),
                "Read each question twice before you start writing".to_string(),
                "Keep an eye on the clock and come back to the hard ones later".to_string(),
            ],
            guides: strings(&[
                "Eat something and drink water before you go in",
                "If you blank on a question, move on and return to it",
                "Leave a few minutes at the end to check your answers",
            ]),
            suggestions: format!(
                "It's {} exam day. Trust the work you've already put in.",
                subject
            ),
            motivation: strings(&[
                "You've prepared for this, now go show it.",
                "Take a breath, you know more than you think.",
                "One question at a time.",
            ]),
        },
        Timing::Past => StudyGuide {
            how_to_complete: vec![
                format!("Write down which {} questions felt hardest", subject),
                "Check your notes for the answers you weren't sure about".to_string(),
                "Note what you'd do differently next time".to_string(),
            ],
            guides: strings(&[
                "Review while the exam is still fresh in your mind",
                "Keep a list of recurring mistakes",
                "Ask a teacher about anything still unclear",
            ]),
            suggestions: format!(
                "Your {} exam is behind you. A short reflection now makes the next one easier.",
                subject
            ),
            motivation: strings(&[
                "Whatever the result, you showed up and did the work.",
                "Every exam teaches you something about how you learn.",
                "Rest up, you've earned it.",
            ]),
        },
    }
}

fn assignment_guide(subject: &str, when: Timing) -> StudyGuide {
    match when {
        Timing::Upcoming(days) => StudyGuide {
            how_to_complete: vec![
                format!("Re-read the {} assignment brief and underline what's being asked", subject),
                "Break the work into small parts and give each one a slot".to_string(),
                "Draft the hardest part first while you're fresh".to_string(),
                "Leave time at the end to proofread and check requirements".to_string(),
            ],
            guides: strings(&[
                "Collect your sources and notes in one place before you start",
                "Write a rough version first, polish later",
                "Check the marking criteria as you go",
            ]),
            suggestions: format!(
                "Your {} assignment is due in {}. Aim to have a full draft a day early.",
                subject,
                days_label(days)
            ),
            motivation: strings(&[
                "Starting is the hardest part, and you're already planning.",
                "A little progress each day adds up fast.",
                "Future you will be glad you didn't leave it to the last night.",
            ]),
        },
        Timing::Today => StudyGuide {
            how_to_complete: vec![
                format!("Read your {} assignment through one last time", subject),
                "Check every requirement in the brief is covered".to_string(),
                "Fix formatting, references and your name on the front page".to_string(),
                "Submit early rather than at the last minute".to_string(),
            ],
            guides: strings(&[
                "Read it out loud to catch clumsy sentences",
                "Double-check the submission format and deadline time",
                "Keep a backup copy",
            ]),
            suggestions: format!("Your {} assignment is due today. Final checks, then hand it in.", subject),
            motivation: strings(&[
                "You're at the finish line.",
                "Done is better than perfect.",
                "Hit submit and enjoy the relief.",
            ]),
        },
        Timing::Past => StudyGuide {
            how_to_complete: vec![
                format!("Look over the {} feedback when it comes back", subject),
                "Note one thing that went well and one to improve".to_string(),
                "File your work and notes for revision later".to_string(),
            ],
            guides: strings(&[
                "Feedback is the fastest way to improve your next piece",
                "Keep a running list of comments that keep coming up",
                "Ask about any feedback you don't understand",
            ]),
            suggestions: format!(
                "Your {} assignment is in. Use the feedback to plan the next one.",
                subject
            ),
            motivation: strings(&[
                "Another piece of work finished.",
                "Each assignment makes the next one easier.",
                "Take a moment to be proud of getting it done.",
            ]),
        },
    }
}

fn revision_guide(subject: &str, when: Timing) -> StudyGuide {
    let framing = match when {
        Timing::Upcoming(days) => format!(
            "You have {} before this {} session. Keep the momentum going with short daily reviews.",
            days_label(days),
            subject
        ),
        Timing::Today => format!(
            "Today is your {} study session. Focus on understanding, not just rereading.",
            subject
        ),
        Timing::Past => format!(
            "Keep {} fresh with a quick recap so it doesn't fade.",
            subject
        ),
    };
    StudyGuide {
        how_to_complete: vec![
            format!("Pick two or three {} topics to cover today", subject),
            "Read through your notes and close the book".to_string(),
            "Write down everything you remember, then check what you missed".to_string(),
            "Try a handful of practice questions on the same topics".to_string(),
        ],
        guides: strings(&[
            "Test yourself instead of just rereading",
            "Mix topics to keep your brain switching",
            "Short and regular beats long and rare",
        ]),
        suggestions: framing,
        motivation: strings(&[
            "Small steps every day lead to big results.",
            "Understanding grows a little every time you review.",
            "You're building something that lasts.",
        ]),
    }
}

/// Prompt asking the service for a guide in the exact JSON shape
/// [`StudyGuide::parse`] accepts.
pub fn build_guide_prompt(target: &GuideTarget, days_until: i64, grade: Option<&str>) -> String {
    let timing = match days_until {
        d if d > 0 => format!("{} away", days_label(d)),
        0 => "today".to_string(),
        d => format!("{} ago", days_label(-d)),
    };
    let level = grade
        .map(|g| format!(" The student is in grade {}.", g))
        .unwrap_or_default();

    format!(
        "You are a friendly study coach helping a student prepare for \"{title}\" \
         ({kind} in {subject}, on {date}, {timing}).{level}\n\
         Write in a warm, conversational tone, like a helpful older classmate. \
         Avoid sounding like an AI and avoid generic filler.\n\
         Respond with ONLY a JSON object, no Markdown, in exactly this shape:\n\
         {{\n  \"howToComplete\": [3 to 6 short step-by-step instructions],\n  \
         \"guides\": [3 to 5 practical tips],\n  \
         \"suggestions\": \"one or two sentences of specific advice for today\",\n  \
         \"motivation\": [exactly 3 short encouraging lines]\n}}",
        title = target.title,
        kind = target.event_type.to_string().to_lowercase(),
        subject = target.subject,
        date = target.date.format("%Y-%m-%d"),
        timing = timing,
        level = level,
    )
}
