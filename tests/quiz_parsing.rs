// File: ./tests/quiz_parsing.rs
use futures::future::BoxFuture;
use smartstudy::client::TextGenerator;
use smartstudy::model::quiz::{build_quiz_prompt, generate_quiz, parse_quiz};
use smartstudy::model::{Difficulty, QuizError};
use std::str::FromStr;

const TWO_QUESTIONS: &str = r#"[
  {
    "question": "What is the SI unit of force?",
    "options": ["Joule", "Newton", "Watt", "Pascal"],
    "correctAnswer": 1,
    "explanation": "Force is measured in newtons."
  },
  {
    "question": "What is 7 x 8?",
    "options": ["54", "56", "58", "64"],
    "correctAnswer": 1,
    "explanation": "7 x 8 = 56."
  }
]"#;

#[test]
fn test_parse_array() {
    let questions = parse_quiz(TWO_QUESTIONS).unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].options[questions[0].correct_answer], "Newton");
    assert_eq!(questions[1].explanation, "7 x 8 = 56.");
}

#[test]
fn test_parse_wrapped_and_fenced() {
    let wrapped = format!("```json\n{{\"questions\": {}}}\n```", TWO_QUESTIONS);
    assert_eq!(parse_quiz(&wrapped).unwrap(), parse_quiz(TWO_QUESTIONS).unwrap());
}

#[test]
fn test_prose_around_json_is_rejected() {
    // No bracket scanning: anything that isn't pure JSON fails.
    let chatty = format!("Here are your questions:\n{}\nGood luck!", TWO_QUESTIONS);
    assert!(matches!(parse_quiz(&chatty), Err(QuizError::NotJson(_))));
}

#[test]
fn test_empty_and_missing_questions() {
    assert_eq!(parse_quiz("[]"), Err(QuizError::NoQuestions));
    assert_eq!(parse_quiz(r#"{"items": []}"#), Err(QuizError::NoQuestions));
    assert_eq!(parse_quiz("42"), Err(QuizError::NoQuestions));
}

#[test]
fn test_option_count_enforced() {
    let three = r#"[{"question": "Q", "options": ["a", "b", "c"], "correctAnswer": 0, "explanation": "e"}]"#;
    let err = parse_quiz(three).unwrap_err();
    assert!(matches!(err, QuizError::Invalid { index: 0, .. }));
    assert!(err.to_string().contains("expected 4 options, got 3"));
}

#[test]
fn test_correct_answer_range() {
    let out_of_range = r#"[{"question": "Q", "options": ["a", "b", "c", "d"], "correctAnswer": 4, "explanation": "e"}]"#;
    assert!(matches!(
        parse_quiz(out_of_range),
        Err(QuizError::Invalid { index: 0, .. })
    ));

    let negative = r#"[{"question": "Q", "options": ["a", "b", "c", "d"], "correctAnswer": -1, "explanation": "e"}]"#;
    assert!(parse_quiz(negative).is_err());
}

#[test]
fn test_bad_question_reports_index() {
    let raw = r#"[
      {"question": "Q1", "options": ["a", "b", "c", "d"], "correctAnswer": 0, "explanation": "e"},
      {"question": "", "options": ["a", "b", "c", "d"], "correctAnswer": 0, "explanation": "e"}
    ]"#;
    let err = parse_quiz(raw).unwrap_err();
    assert!(matches!(err, QuizError::Invalid { index: 1, .. }));
    assert!(err.to_string().starts_with("question 2 is invalid"));
}

#[test]
fn test_difficulty_from_str() {
    assert_eq!(Difficulty::from_str("hard").unwrap(), Difficulty::Hard);
    assert_eq!(Difficulty::from_str("EASY").unwrap(), Difficulty::Easy);
    assert_eq!(Difficulty::default(), Difficulty::Medium);
    assert!(Difficulty::from_str("impossible").is_err());
    assert_eq!(Difficulty::Hard.to_string(), "hard");
}

#[test]
fn test_quiz_prompt() {
    let prompt = build_quiz_prompt("photosynthesis", 3, Difficulty::Easy, Some("7"));
    assert!(prompt.contains("Write 3 easy multiple-choice"));
    assert!(prompt.contains("\"photosynthesis\""));
    assert!(prompt.contains("grade 7"));
    assert!(prompt.contains("correctAnswer"));
}

struct Canned(&'static str);

impl TextGenerator for Canned {
    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, anyhow::Result<String>> {
        Box::pin(async move { Ok(self.0.to_string()) })
    }
}

#[tokio::test]
async fn test_generate_quiz_surfaces_errors() {
    let questions = generate_quiz(&Canned(TWO_QUESTIONS), "units", 2, Difficulty::Medium, None)
        .await
        .unwrap();
    assert_eq!(questions.len(), 2);

    let err = generate_quiz(&Canned("not json"), "units", 2, Difficulty::Medium, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QuizError>(),
        Some(QuizError::NotJson(_))
    ));
}
