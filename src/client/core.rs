// File: ./src/client/core.rs
use crate::client::TextGenerator;
use crate::config::Config;

use anyhow::{Context, Result, anyhow, bail};
use futures::future::BoxFuture;
use http::{HeaderValue, Method, Request, Uri, header};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tower::ServiceExt;
use tower_http::auth::AddAuthorization;

type HttpsClient = AddAuthorization<Client<hyper_rustls::HttpsConnector<HttpConnector>, String>>;

const SYSTEM_PROMPT: &str =
    "You are SmartStudy, a study assistant for students. Reply with exactly what is asked.";

// Error bodies can be large HTML pages.
const MAX_ERROR_BODY: usize = 300;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Everything needed to build an [`AiClient`].
#[derive(Clone, Debug, PartialEq)]
pub struct AiSettings {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f32,
}

impl AiSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.ai_endpoint.clone(),
            api_key: config.api_key(),
            model: config.ai_model.clone(),
            timeout: Duration::from_secs(config.ai_timeout_secs.max(1)),
            temperature: config.ai_temperature,
        }
    }
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct AiClient {
    http: HttpsClient,
    endpoint: Uri,
    model: String,
    timeout: Duration,
    temperature: f32,
}

impl fmt::Debug for AiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AiClient {
    pub fn new(settings: &AiSettings) -> Result<Self, String> {
        if settings.endpoint.trim().is_empty() {
            return Err("AI endpoint is not configured".to_string());
        }
        let endpoint: Uri = settings
            .endpoint
            .trim()
            .parse()
            .map_err(|e: http::uri::InvalidUri| format!("Invalid AI endpoint: {}", e))?;
        if !matches!(endpoint.scheme_str(), Some("http") | Some("https")) {
            return Err(format!(
                "AI endpoint must be an http(s) URL: {}",
                settings.endpoint
            ));
        }
        // AddAuthorization panics on values that are not valid header text.
        HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
            .map_err(|_| "AI API key contains invalid characters".to_string())?;

        let mut root_store = rustls::RootCertStore::empty();
        let result = rustls_native_certs::load_native_certs();
        root_store.add_parsable_certificates(result.certs);
        if root_store.is_empty() {
            log::warn!("No system certificates found; HTTPS endpoints will fail verification");
        }
        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let http_client = Client::builder(TokioExecutor::new()).build(https_connector);
        let http = AddAuthorization::bearer(http_client, &settings.api_key);

        Ok(Self {
            http,
            endpoint,
            model: settings.model.clone(),
            timeout: settings.timeout,
            temperature: settings.temperature,
        })
    }

    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    /// Sends one prompt and returns the first choice's text. The whole
    /// exchange, body included, is bounded by the configured timeout.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let body = serde_json::to_string(&ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
        })?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .body(body)?;

        let exchange = async {
            let response = self
                .http
                .clone()
                .oneshot(request)
                .await
                .map_err(|e| anyhow!("Request to {} failed: {}", self.endpoint, e))?;
            let status = response.status();
            let bytes = response
                .into_body()
                .collect()
                .await
                .context("Failed to read AI response body")?
                .to_bytes();
            Ok::<_, anyhow::Error>((status, bytes))
        };

        let (status, bytes) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| anyhow!("AI request timed out after {:?}", self.timeout))??;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            let snippet: String = text.chars().take(MAX_ERROR_BODY).collect();
            bail!("AI service returned {}: {}", status, snippet.trim());
        }

        let parsed: ChatResponse =
            serde_json::from_slice(&bytes).context("Unexpected AI response format")?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| anyhow!("AI response contained no text"))?;

        log::debug!("AI response received ({} chars)", content.len());
        Ok(content)
    }
}

impl TextGenerator for AiClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.complete(prompt))
    }
}
