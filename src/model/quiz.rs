// File: ./src/model/quiz.rs
//! Multiple-choice practice quizzes returned by the generative text service.
use crate::client::TextGenerator;
use crate::model::guide::strip_code_fences;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use strum::{Display, EnumString};

pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    NotJson(String),
    NoQuestions,
    Invalid { index: usize, reason: String },
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizError::NotJson(e) => write!(f, "quiz response is not valid JSON: {}", e),
            QuizError::NoQuestions => write!(f, "quiz response contains no questions"),
            QuizError::Invalid { index, reason } => {
                write!(f, "question {} is invalid: {}", index + 1, reason)
            }
        }
    }
}

impl std::error::Error for QuizError {}

fn invalid(index: usize, reason: impl Into<String>) -> QuizError {
    QuizError::Invalid {
        index,
        reason: reason.into(),
    }
}

fn required_str<'a>(item: &'a Value, field: &str, index: usize) -> Result<&'a str, QuizError> {
    let s = item
        .get(field)
        .ok_or_else(|| invalid(index, format!("missing '{}'", field)))?
        .as_str()
        .ok_or_else(|| invalid(index, format!("'{}' must be a string", field)))?
        .trim();
    if s.is_empty() {
        return Err(invalid(index, format!("'{}' is empty", field)));
    }
    Ok(s)
}

fn parse_question(item: &Value, index: usize) -> Result<QuizQuestion, QuizError> {
    if !item.is_object() {
        return Err(invalid(index, "not an object"));
    }
    let question = required_str(item, "question", index)?.to_string();

    let options = item
        .get("options")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(index, "'options' must be an array"))?;
    if options.len() != OPTIONS_PER_QUESTION {
        return Err(invalid(
            index,
            format!(
                "expected {} options, got {}",
                OPTIONS_PER_QUESTION,
                options.len()
            ),
        ));
    }
    let options = options
        .iter()
        .map(|o| match o.as_str().map(str::trim) {
            Some(s) if !s.is_empty() => Ok(s.to_string()),
            _ => Err(invalid(index, "options must be non-empty strings")),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let correct_answer = item
        .get("correctAnswer")
        .and_then(Value::as_u64)
        .ok_or_else(|| invalid(index, "'correctAnswer' must be an option index"))?
        as usize;
    if correct_answer >= OPTIONS_PER_QUESTION {
        return Err(invalid(
            index,
            format!("'correctAnswer' {} is out of range", correct_answer),
        ));
    }

    let explanation = required_str(item, "explanation", index)?.to_string();

    Ok(QuizQuestion {
        question,
        options,
        correct_answer,
        explanation,
    })
}

/// Accepts either a bare array of questions or `{"questions": [...]}`.
pub fn parse_quiz(raw: &str) -> Result<Vec<QuizQuestion>, QuizError> {
    let body = strip_code_fences(raw);
    let value: Value = serde_json::from_str(body).map_err(|e| QuizError::NotJson(e.to_string()))?;
    let items = match &value {
        Value::Array(items) => items,
        Value::Object(obj) => obj
            .get("questions")
            .and_then(Value::as_array)
            .ok_or(QuizError::NoQuestions)?,
        _ => return Err(QuizError::NoQuestions),
    };
    if items.is_empty() {
        return Err(QuizError::NoQuestions);
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_question(item, i))
        .collect()
}

pub fn build_quiz_prompt(
    topic: &str,
    count: usize,
    difficulty: Difficulty,
    grade: Option<&str>,
) -> String {
    let level = grade
        .map(|g| format!(" for a grade {} student", g))
        .unwrap_or_default();
    format!(
        "Write {count} {difficulty} multiple-choice practice questions about \"{topic}\"{level}.\n\
         Respond with ONLY a JSON array, no Markdown. Each element must be:\n\
         {{\"question\": string, \"options\": [exactly 4 strings], \
         \"correctAnswer\": index of the right option (0-3), \
         \"explanation\": one or two sentences on why it is right}}"
    )
}

/// Unlike study guides, quizzes have no template fallback: errors surface.
pub async fn generate_quiz(
    generator: &dyn TextGenerator,
    topic: &str,
    count: usize,
    difficulty: Difficulty,
    grade: Option<&str>,
) -> anyhow::Result<Vec<QuizQuestion>> {
    let prompt = build_quiz_prompt(topic, count, difficulty, grade);
    let raw = generator.generate(&prompt).await?;
    let questions = parse_quiz(&raw)?;
    if questions.len() != count {
        log::debug!("Asked for {} questions, got {}", count, questions.len());
    }
    Ok(questions)
}
