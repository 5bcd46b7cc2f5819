//! Generative summarization services.
//!
//! A [`SummaryService`] turns a prompt into summary text. Two backends exist:
//! a local Ollama server (see [`crate::ollama`]) and Gemini through rstructor.
//! Callers never see a service failure as fatal; the pipeline falls back to
//! extractive summarization.

use crate::config::{Config, ConfigError};
use crate::ollama::OllamaClient;
use crate::summary::LengthTier;
use async_trait::async_trait;
use rstructor::{GeminiClient, GeminiModel, LLMClient};
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Input budget for Gemini models, which handle far more context than local ones.
const GEMINI_MAX_INPUT_CHARS: usize = 30_000;

/// Classified failure of a service call.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("no summarization service configured")]
    NotConfigured,
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("AI summarization disabled in settings")]
    Disabled,
    #[error("missing credential: {0}")]
    MissingCredential(#[from] ConfigError),
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("request timed out after {} seconds", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ServiceError {
    /// Map a non-success HTTP status to its error class
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ServiceError::Auth(format!("HTTP {status}: {body}")),
            429 => ServiceError::RateLimited(format!("HTTP {status}: {body}")),
            _ => ServiceError::Status { status, body },
        }
    }

    /// Best-effort classification of an opaque client error message
    pub fn from_message(message: String) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("401")
            || lower.contains("403")
            || lower.contains("api key")
            || lower.contains("unauthenticated")
            || lower.contains("permission_denied")
        {
            ServiceError::Auth(message)
        } else if lower.contains("429") || lower.contains("resource_exhausted") {
            ServiceError::RateLimited(message)
        } else {
            ServiceError::Transport(message)
        }
    }
}

/// One generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    pub prompt: String,
    pub tier: LengthTier,
    /// Upper bound on generated tokens, when the backend supports one
    pub max_output_tokens: Option<u32>,
}

/// A remote text-completion endpoint.
#[async_trait]
pub trait SummaryService: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Longest input text, in characters, sent to this service
    fn max_input_chars(&self) -> usize;

    async fn generate(&self, request: &ServiceRequest) -> Result<String, ServiceError>;

    /// Lightweight availability check, returning the usable model names
    async fn probe(&self) -> Result<Vec<String>, ServiceError>;
}

/// Build the service selected by `config.agent.provider`.
pub fn service_from_config(config: &Config) -> Result<Box<dyn SummaryService>, ServiceError> {
    match config.agent.provider.trim().to_ascii_lowercase().as_str() {
        "ollama" => {
            let client = OllamaClient::new(&config.agent.base_url, &config.agent.model)?
                .with_timeouts(config.generation_timeout(), config.probe_timeout());
            Ok(Box::new(client))
        }
        "gemini" => {
            let api_key = config.api_key()?.to_string();
            Ok(Box::new(GeminiService::new(api_key, config.agent.model.clone())))
        }
        "" | "none" => Err(ServiceError::NotConfigured),
        other => Err(ServiceError::UnknownProvider(other.to_string())),
    }
}

/// Cut `text` to `max_chars` characters, marking the cut with `...`
pub fn truncate_input(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => Cow::Owned(format!("{}...", &text[..idx])),
        None => Cow::Borrowed(text),
    }
}

/// Tier-specific instruction followed by the text to summarize
pub fn build_prompt(text: &str, tier: LengthTier) -> String {
    let instruction = match tier {
        LengthTier::Short => {
            "You are an expert content analyst. Write a concise summary of the text below.

Rules:
- Exactly 3 or 4 sentences that build on each other.
- Put key terms, numbers and names in **bold**.
- Explain why the information matters, not only what it says.
- Finish with the main takeaway."
        }
        LengthTier::Medium => {
            "You are a senior analyst writing for busy decision makers. Summarize the text below.

Structure:
1. An opening paragraph giving context and why it matters.
2. Three to five bullet points, each starting with a **bold key insight** and a short explanation.
3. A closing paragraph with implications and takeaways.

Put important terms, metrics and names in **bold**."
        }
        LengthTier::Long => {
            "You are a research analyst preparing a detailed briefing. Analyze the text below.

Use these Markdown sections:
## Overview
## Background
## Key Findings (at least four bullet points with supporting evidence)
## Analysis (how the findings connect and who they affect)
## Key Takeaways

Put key terms, metrics, names and dates in **bold**."
        }
    };

    format!("{instruction}\n\nText:\n{text}")
}

/// Gemini through rstructor
pub struct GeminiService {
    api_key: String,
    model: String,
}

impl GeminiService {
    pub fn new(api_key: String, model: String) -> Self {
        Self { api_key, model }
    }
}

#[async_trait]
impl SummaryService for GeminiService {
    fn name(&self) -> &str {
        "gemini"
    }

    fn max_input_chars(&self) -> usize {
        GEMINI_MAX_INPUT_CHARS
    }

    async fn generate(&self, request: &ServiceRequest) -> Result<String, ServiceError> {
        let client = GeminiClient::new(self.api_key.as_str())
            .map_err(|e| ServiceError::from_message(e.to_string()))?
            .model(parse_gemini_model(&self.model));

        debug!(model = %self.model, prompt_chars = request.prompt.len(), "calling gemini");
        let result = client
            .generate_with_metadata(&request.prompt)
            .await
            .map_err(|e| ServiceError::from_message(e.to_string()))?;

        Ok(result.text)
    }

    async fn probe(&self) -> Result<Vec<String>, ServiceError> {
        // No cheap listing call; a configured key is treated as available.
        Ok(vec![self.model.clone()])
    }
}

/// Parse a model string into a GeminiModel
fn parse_gemini_model(model: &str) -> GeminiModel {
    match model {
        "gemini-2.0-flash" => GeminiModel::Gemini20Flash,
        "gemini-2.5-flash" => GeminiModel::Gemini25Flash,
        "gemini-2.5-pro" => GeminiModel::Gemini25Pro,
        _ => GeminiModel::Gemini20Flash, // Default
    }
}
