// File: ./src/client/manager.rs
use crate::client::TextGenerator;
use crate::client::core::{AiClient, AiSettings};
use anyhow::Result;
use futures::future::BoxFuture;
use once_cell::sync::OnceCell;

/// Owns the AI client for one session.
///
/// The client is built on first use and released by [`LazyAiClient::shutdown`]
/// (or on drop). Nothing about it is global: callers construct a handle and
/// pass it to whatever needs to generate text.
#[derive(Debug)]
pub struct LazyAiClient {
    settings: AiSettings,
    client: OnceCell<AiClient>,
}

impl LazyAiClient {
    pub fn new(settings: AiSettings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }

    pub fn get(&self) -> Result<&AiClient, String> {
        self.client.get_or_try_init(|| {
            log::debug!("Initializing AI client for {}", self.settings.endpoint);
            AiClient::new(&self.settings)
        })
    }

    /// Drops the underlying client. A later call builds a fresh one.
    pub fn shutdown(&mut self) {
        if self.client.take().is_some() {
            log::debug!("AI client released");
        }
    }
}

impl TextGenerator for LazyAiClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let client = self.get().map_err(anyhow::Error::msg)?;
            client.complete(prompt).await
        })
    }
}
