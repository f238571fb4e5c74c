// File: ./src/model/mod.rs
pub mod extractor;
pub mod guide;
pub mod item;
pub mod parser;
pub mod quiz;

pub use extractor::extract_events;
pub use guide::{GuideError, GuideTarget, StudyGuide};
pub use item::{Event, EventType, PlanEntry};
pub use parser::parse_date_phrase;
pub use quiz::{Difficulty, QuizError, QuizQuestion};
