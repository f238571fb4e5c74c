// File: ./src/storage.rs
// Saves the last generated plan and exports plans as iCalendar.
//
// Bump PLAN_STORAGE_VERSION when PlanEntry's serialized shape changes.
use crate::context::AppContext;
use crate::model::PlanEntry;
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use fs2::FileExt;
use icalendar::{Calendar, Component, Event, Property};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Version history:
// - v1: request, generated_on, entries
const PLAN_STORAGE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPlan {
    #[serde(default)]
    pub version: u32,
    pub request: String,
    pub generated_on: NaiveDate,
    pub entries: Vec<PlanEntry>,
}

impl SavedPlan {
    pub fn new(request: impl Into<String>, generated_on: NaiveDate, entries: Vec<PlanEntry>) -> Self {
        Self {
            version: PLAN_STORAGE_VERSION,
            request: request.into(),
            generated_on,
            entries,
        }
    }
}

pub struct PlanStorage;

impl PlanStorage {
    pub fn save(ctx: &dyn AppContext, plan: &SavedPlan) -> Result<()> {
        let path = ctx.get_plan_path()?;
        Self::with_lock(&path, || {
            let json = serde_json::to_string_pretty(plan)?;
            Self::atomic_write(&path, json)
        })
    }

    /// `Ok(None)` when no plan has been saved yet.
    pub fn load(ctx: &dyn AppContext) -> Result<Option<SavedPlan>> {
        let path = ctx.get_plan_path()?;
        if !path.exists() {
            return Ok(None);
        }
        Self::with_lock(&path, || {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read saved plan '{}'", path.display()))?;
            let plan: SavedPlan = serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse saved plan '{}'", path.display()))?;
            if plan.version > PLAN_STORAGE_VERSION {
                anyhow::bail!(
                    "Saved plan has version {} but this build only reads up to {}",
                    plan.version,
                    PLAN_STORAGE_VERSION
                );
            }
            Ok(Some(plan))
        })
    }

    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Write to a .tmp sibling, then rename over the target.
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// One all-day VEVENT per entry.
    pub fn to_ics_string(entries: &[PlanEntry]) -> String {
        let mut calendar = Calendar::new();
        calendar.name("SmartStudy Plan");

        for entry in entries {
            let mut event = Event::new();
            event.uid(&uuid::Uuid::new_v4().to_string());
            event.summary(&entry.title);
            event.description(&entry.notes_text());
            event.timestamp(Utc::now());
            event.add_property("CATEGORIES", entry.event_type.to_string());

            let mut start = Property::new("DTSTART", entry.date.format("%Y%m%d").to_string());
            start.add_parameter("VALUE", "DATE");
            event.append_property(start);

            // DTEND is exclusive for all-day events.
            if let Some(next) = entry.date.checked_add_days(Days::new(1)) {
                let mut end = Property::new("DTEND", next.format("%Y%m%d").to_string());
                end.add_parameter("VALUE", "DATE");
                event.append_property(end);
            }

            calendar.push(event);
        }
        calendar.to_string()
    }
}
