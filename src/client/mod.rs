// File: ./src/client/mod.rs
pub mod core;
pub mod manager;

use futures::future::BoxFuture;

pub use crate::client::core::{AiClient, AiSettings};
pub use crate::client::manager::LazyAiClient;

/// A service that turns a prompt into free text.
///
/// The planner and quiz generator only see this trait, so tests can swap in
/// canned responses and the CLI can run with no network at all.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, anyhow::Result<String>>;
}
