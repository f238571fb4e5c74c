// File: ./tests/planner_tests.rs
// Plan synthesis and study-guide enrichment, with canned text generators.
use anyhow::anyhow;
use chrono::{Days, NaiveDate};
use futures::future::BoxFuture;
use smartstudy::client::TextGenerator;
use smartstudy::enrich::{GuideSource, enrich, generate_guide};
use smartstudy::model::guide::GuideTarget;
use smartstudy::model::{Event, EventType, GuideError, PlanEntry, StudyGuide};
use smartstudy::planner::{MAX_PLAN_DAYS, Planner, Tier, synthesize, total_days};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const EXAMPLE_REQUEST: &str = "physics exam after 3 days, chemistry assignment after 5 days";

const VALID_GUIDE: &str = r#"```json
{
  "howToComplete": ["Read the chapter", "Do the exercises", "Check answers"],
  "guides": ["Use flashcards", "Take breaks", "Sleep well"],
  "suggestions": "Start with kinematics.",
  "motivation": ["You got this", "Keep going", "Almost there"]
}
```"#;

const NO_MOTIVATION: &str = r#"{
  "howToComplete": ["Read the chapter"],
  "guides": ["Use flashcards"],
  "suggestions": "Start with kinematics."
}"#;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct CannedGenerator {
    response: String,
    calls: AtomicUsize,
}

impl CannedGenerator {
    fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl TextGenerator for CannedGenerator {
    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, anyhow::Result<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.response.clone();
        Box::pin(async move { Ok(response) })
    }
}

struct FailingGenerator;

impl TextGenerator for FailingGenerator {
    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, anyhow::Result<String>> {
        Box::pin(async { Err(anyhow!("connection refused")) })
    }
}

/// Echoes the prompt back as the suggestion. Earlier calls take longer, so
/// with concurrency they finish out of order.
struct EchoGenerator {
    calls: AtomicUsize,
}

impl TextGenerator for EchoGenerator {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, anyhow::Result<String>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(60u64.saturating_sub(n * 10))).await;
            let guide = StudyGuide {
                how_to_complete: vec!["step".to_string()],
                guides: vec!["tip".to_string()],
                suggestions: prompt.to_string(),
                motivation: vec!["go".to_string()],
            };
            Ok(guide.to_json())
        })
    }
}

fn guide(entry: &PlanEntry) -> StudyGuide {
    entry
        .study_guide()
        .unwrap_or_else(|| panic!("entry '{}' has no study guide", entry.title))
}

#[tokio::test]
async fn test_example_plan_offline() {
    let today = date(2024, 1, 1);
    let plan = Planner::offline().plan(EXAMPLE_REQUEST, today).await;

    let rows: Vec<(NaiveDate, &str, EventType)> = plan
        .iter()
        .map(|e| (e.date, e.title.as_str(), e.event_type))
        .collect();
    assert_eq!(
        rows,
        vec![
            (date(2024, 1, 1), "Physics Intensive Review", EventType::Revision),
            (date(2024, 1, 2), "Physics Intensive Review", EventType::Revision),
            (date(2024, 1, 3), "Physics Intensive Review", EventType::Revision),
            (date(2024, 1, 4), "Physics Exam", EventType::Exam),
            (date(2024, 1, 5), "Chemistry Intensive Review", EventType::Revision),
            (date(2024, 1, 6), "Chemistry Assignment", EventType::Assignment),
        ]
    );

    // Intensive days are written against the upcoming event.
    assert_eq!(
        guide(&plan[0]),
        StudyGuide::fallback(EventType::Exam, "Physics", 3)
    );
    assert_eq!(
        guide(&plan[2]),
        StudyGuide::fallback(EventType::Exam, "Physics", 1)
    );
    assert_eq!(
        guide(&plan[3]),
        StudyGuide::fallback(EventType::Exam, "Physics", 0)
    );
    assert_eq!(
        guide(&plan[5]),
        StudyGuide::fallback(EventType::Assignment, "Chemistry", 0)
    );
}

#[tokio::test]
async fn test_aptitude_plan() {
    let today = date(2024, 3, 10);
    let plan = Planner::offline()
        .plan("study for my aptitude test in 2 days", today)
        .await;

    assert_eq!(plan.len(), 3);
    assert_eq!(plan[0].title, "Aptitude Intensive Review");
    assert_eq!(plan[1].title, "Aptitude Intensive Review");
    assert_eq!(plan[2].title, "Aptitude Exam");
    assert_eq!(plan[2].date, date(2024, 3, 12));
    assert!(plan.iter().all(|e| e.study_guide().is_some()));
}

#[test]
fn test_tiers_for_distant_event() {
    let today = date(2024, 1, 1);
    let events = vec![Event::new("Biology", EventType::Exam, date(2024, 1, 11))];
    assert_eq!(total_days(&events, today), 10);

    let slots = synthesize(&events, today);
    let days: Vec<(i64, Tier)> = slots.iter().map(|s| (s.day, s.tier)).collect();
    assert_eq!(
        days,
        vec![
            (0, Tier::Light),
            (2, Tier::Light),
            (3, Tier::Moderate),
            (4, Tier::Moderate),
            (5, Tier::Moderate),
            (6, Tier::Moderate),
            (7, Tier::Intensive),
            (8, Tier::Intensive),
            (9, Tier::Intensive),
            (10, Tier::EventDay),
        ]
    );
}

#[tokio::test]
async fn test_moderate_and_light_notes_are_fixed() {
    let today = date(2024, 1, 1);
    let plan = Planner::new(Some(&FailingGenerator))
        .plan("biology exam in 10 days", today)
        .await;

    assert_eq!(plan.len(), 10);
    assert_eq!(plan[0].title, "Biology Preparation");
    assert!(plan[0].study_guide().is_none());
    assert!(plan[0].notes.contains("10 days to go"));

    let moderate: Vec<&PlanEntry> = plan
        .iter()
        .filter(|e| e.title == "Biology Study Session")
        .collect();
    assert_eq!(moderate.len(), 4);
    for entry in moderate {
        assert_eq!(entry.notes, "Review Biology concepts and practice problems");
        assert_eq!(entry.event_type, EventType::Revision);
    }
}

#[tokio::test]
async fn test_plan_is_ordered_and_bounded() {
    let today = date(2024, 2, 20);
    let request = "english essay in 12 days, maths test after 4 days, history project in 8 days";
    let events = smartstudy::model::extract_events(request, today);
    let last = events.iter().map(|e| e.date).max().unwrap();

    let plan = Planner::offline().plan(request, today).await;
    assert!(!plan.is_empty());
    assert!(plan.windows(2).all(|w| w[0].date <= w[1].date));
    assert!(plan.iter().all(|e| e.date >= today && e.date <= last));
    assert_eq!(plan.last().map(|e| e.date), Some(last));
}

#[tokio::test]
async fn test_intensive_window_has_every_day() {
    let today = date(2024, 1, 1);
    let plan = Planner::offline().plan("chemistry exam in 20 days", today).await;
    let exam = date(2024, 1, 21);

    for offset in 1..=3u64 {
        let day = exam.checked_sub_days(Days::new(offset)).unwrap();
        let entries: Vec<_> = plan.iter().filter(|e| e.date == day).collect();
        assert_eq!(entries.len(), 1, "missing intensive entry on {}", day);
        assert_eq!(entries[0].title, "Chemistry Intensive Review");
    }
    for entry in plan.iter().filter(|e| e.title == "Chemistry Preparation") {
        let day = (entry.date - today).num_days();
        assert_eq!(day % 2, 0, "light entry on odd day {}", day);
    }
}

#[tokio::test]
async fn test_same_day_events_get_separate_entries() {
    let today = date(2024, 1, 1);
    let plan = Planner::offline()
        .plan("physics exam in 1 day, chemistry test in 1 day", today)
        .await;

    assert_eq!(plan.len(), 3);
    assert_eq!(plan[0].title, "Physics Intensive Review");
    assert_eq!(plan[1].title, "Physics Exam");
    assert_eq!(plan[2].title, "Chemistry Exam");
    assert_eq!(plan[1].date, plan[2].date);
}

#[tokio::test]
async fn test_empty_event_list_becomes_general_session() {
    let today = date(2024, 1, 1);
    let plan = Planner::offline().plan_events(&[], today).await;

    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0].title, "General Intensive Review");
    assert_eq!(plan[1].title, "General Study Session");
    assert_eq!(plan[1].date, date(2024, 1, 2));
    assert_eq!(plan[1].subject, "General");
}

#[tokio::test]
async fn test_past_events_leave_general_review() {
    let today = date(2024, 1, 10);
    let events = vec![Event::new("Physics", EventType::Exam, date(2024, 1, 8))];
    let plan = Planner::offline().plan_events(&events, today).await;

    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].title, "General Review Session");
    assert_eq!(plan[0].date, today);
    assert!(plan[0].study_guide().is_none());
}

#[tokio::test]
async fn test_generated_guides_are_used() {
    let generator = CannedGenerator::new(VALID_GUIDE);
    let plan = Planner::new(Some(&generator))
        .plan(EXAMPLE_REQUEST, date(2024, 1, 1))
        .await;

    assert_eq!(plan.len(), 6);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 6);
    let expected = StudyGuide::parse(VALID_GUIDE).unwrap();
    for entry in &plan {
        assert_eq!(guide(entry), expected);
    }
}

#[tokio::test]
async fn test_guide_without_motivation_is_replaced() {
    let generator = CannedGenerator::new(NO_MOTIVATION);
    let today = date(2024, 1, 1);
    let plan = Planner::new(Some(&generator))
        .plan(EXAMPLE_REQUEST, today)
        .await;
    let offline = Planner::offline().plan(EXAMPLE_REQUEST, today).await;

    assert_eq!(generator.calls.load(Ordering::SeqCst), 6);
    assert_eq!(plan, offline);
    assert!(plan.iter().all(|e| !e.notes.contains("kinematics")));
}

#[tokio::test]
async fn test_generator_errors_never_drop_days() {
    let today = date(2024, 1, 1);
    let plan = Planner::new(Some(&FailingGenerator))
        .plan(EXAMPLE_REQUEST, today)
        .await;
    let offline = Planner::offline().plan(EXAMPLE_REQUEST, today).await;
    assert_eq!(plan, offline);
}

#[tokio::test]
async fn test_concurrency_preserves_order() {
    let today = date(2024, 1, 1);

    let sequential = EchoGenerator {
        calls: AtomicUsize::new(0),
    };
    let parallel = EchoGenerator {
        calls: AtomicUsize::new(0),
    };
    let a = Planner::new(Some(&sequential))
        .with_concurrency(1)
        .plan(EXAMPLE_REQUEST, today)
        .await;
    let b = Planner::new(Some(&parallel))
        .with_concurrency(8)
        .plan(EXAMPLE_REQUEST, today)
        .await;

    assert_eq!(a, b);
    // Each suggestion is the prompt for that day, so order is visible.
    let timings: Vec<String> = b.iter().map(|e| guide(e).suggestions).collect();
    assert!(timings[0].contains("3 days away"));
    assert!(timings[1].contains("2 days away"));
    assert!(timings[2].contains("1 day away"));
    assert!(timings[3].contains("Physics Exam") && timings[3].contains("today"));
    assert!(timings[4].contains("Chemistry Assignment"));
}

#[tokio::test]
async fn test_grade_reaches_prompt() {
    let generator = EchoGenerator {
        calls: AtomicUsize::new(0),
    };
    let plan = Planner::new(Some(&generator))
        .with_grade(Some("10"))
        .plan("physics exam in 1 day", date(2024, 1, 1))
        .await;
    assert!(guide(&plan[0]).suggestions.contains("grade 10"));
}

fn physics_target() -> GuideTarget {
    GuideTarget {
        title: "Physics Exam".to_string(),
        subject: "Physics".to_string(),
        event_type: EventType::Exam,
        date: date(2024, 1, 4),
    }
}

#[tokio::test]
async fn test_generate_guide_reports_validation_error() {
    let generator = CannedGenerator::new(NO_MOTIVATION);
    let err = generate_guide(&generator, &physics_target(), 3, None)
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<GuideError>(),
        Some(&GuideError::MissingField("motivation"))
    );
}

#[tokio::test]
async fn test_enrich_sources() {
    let target = physics_target();

    let (guide, source) = enrich(None, &target, 2, None).await;
    assert_eq!(source, GuideSource::Template);
    assert_eq!(guide, StudyGuide::fallback(EventType::Exam, "Physics", 2));

    let generator = CannedGenerator::new(VALID_GUIDE);
    let (_, source) = enrich(Some(&generator), &target, 2, None).await;
    assert_eq!(source, GuideSource::Generated);

    let (_, source) = enrich(Some(&FailingGenerator), &target, 2, None).await;
    assert_eq!(source, GuideSource::Template);
}

#[tokio::test]
async fn test_far_future_event_is_bounded() {
    let today = date(2024, 1, 1);
    let events = smartstudy::model::extract_events("physics exam after 90000000 days", today);
    assert_eq!(total_days(&events, today), 90_000_000);

    let slots = synthesize(&events, today);
    // Light-tier days up to the horizon, then the exam itself.
    assert_eq!(slots.len(), MAX_PLAN_DAYS as usize / 2 + 2);
    assert!(slots.windows(2).all(|w| w[0].date <= w[1].date));
    let last = slots.last().unwrap();
    assert_eq!(last.tier, Tier::EventDay);
    assert_eq!(last.day, 90_000_000);
    assert_eq!(last.date, events[0].date);

    let plan = Planner::offline()
        .plan("physics exam after 90000000 days", today)
        .await;
    assert_eq!(plan.len(), slots.len());
    assert_eq!(plan.last().map(|e| e.title.as_str()), Some("Physics Exam"));
}

#[test]
fn test_events_past_horizon_keep_their_order() {
    let today = date(2024, 1, 1);
    let far = today.checked_add_days(Days::new(20_000)).unwrap();
    let farther = today.checked_add_days(Days::new(30_000)).unwrap();
    let events = vec![
        Event::new("History", EventType::Exam, farther),
        Event::new("Biology", EventType::Assignment, far),
    ];

    let slots = synthesize(&events, today);
    let tail: Vec<&str> = slots[slots.len() - 2..]
        .iter()
        .map(|s| s.title.as_str())
        .collect();
    assert_eq!(tail, vec!["Biology Assignment", "History Exam"]);
    assert!(slots.iter().all(|s| s.date <= farther));
}
