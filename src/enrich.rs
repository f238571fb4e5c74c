// File: ./src/enrich.rs
//! Study-guide enrichment: ask the text generator, validate, fall back.
//!
//! Everything here is fail-soft. A missing generator, a network error, a
//! timeout or a response that fails validation all end in the template
//! guide, never in an error.
use crate::client::TextGenerator;
use crate::model::guide::{GuideTarget, StudyGuide, build_guide_prompt};
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideSource {
    Generated,
    Template,
}

/// Primary path only: any failure is returned to the caller.
pub async fn generate_guide(
    generator: &dyn TextGenerator,
    target: &GuideTarget,
    days_until: i64,
    grade: Option<&str>,
) -> Result<StudyGuide> {
    let prompt = build_guide_prompt(target, days_until, grade);
    let raw = generator.generate(&prompt).await?;
    Ok(StudyGuide::parse(&raw)?)
}

pub async fn enrich(
    generator: Option<&dyn TextGenerator>,
    target: &GuideTarget,
    days_until: i64,
    grade: Option<&str>,
) -> (StudyGuide, GuideSource) {
    if let Some(generator) = generator {
        match generate_guide(generator, target, days_until, grade).await {
            Ok(guide) => return (guide, GuideSource::Generated),
            Err(e) => log::warn!(
                "Study guide for '{}' on {} fell back to template: {:#}",
                target.title,
                target.date,
                e
            ),
        }
    }
    let guide = StudyGuide::fallback(target.event_type, &target.subject, days_until);
    (guide, GuideSource::Template)
}
