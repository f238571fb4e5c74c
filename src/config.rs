// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::storage::PlanStorage;
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

/// Overrides `ai_api_key` when set and non-empty.
pub const API_KEY_ENV: &str = "SMARTSTUDY_API_KEY";

fn default_true() -> bool {
    true
}
fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_timeout_secs() -> u64 {
    20
}
fn default_temperature() -> f32 {
    0.7
}
fn default_concurrency() -> usize {
    4
}
fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default = "default_endpoint")]
    pub ai_endpoint: String,
    #[serde(default = "default_model")]
    pub ai_model: String,
    #[serde(default)]
    pub ai_api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub ai_timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub ai_temperature: f32,
    #[serde(default = "default_true")]
    pub ai_guides_enabled: bool,
    // 1 reproduces strictly sequential enrichment.
    #[serde(default = "default_concurrency")]
    pub enrichment_concurrency: usize,
    #[serde(default)]
    pub default_grade: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ai_endpoint: default_endpoint(),
            ai_model: default_model(),
            ai_api_key: String::new(),
            ai_timeout_secs: default_timeout_secs(),
            ai_temperature: default_temperature(),
            ai_guides_enabled: true,
            enrichment_concurrency: default_concurrency(),
            default_grade: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(config) => Ok(config),
            Err(e) if Self::is_missing_config_error(&e) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Detects whether an error means the config file was missing, either via
    /// our explicit message or an IO NotFound anywhere in the chain.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }
        err.chain().any(|cause| {
            cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
        })
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        PlanStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            PlanStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })
    }

    pub fn get_path_string(ctx: &dyn AppContext) -> Result<String> {
        let path = ctx.get_config_file_path()?;
        Ok(path.to_string_lossy().to_string())
    }

    pub fn api_key(&self) -> String {
        match env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => self.ai_api_key.clone(),
        }
    }

    pub fn grade(&self) -> Option<&str> {
        self.default_grade
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse()
            .unwrap_or(log::LevelFilter::Info)
    }
}
