//! Summarization orchestration: AI first when allowed, extractive otherwise.
//!
//! Service failures of any kind are logged and absorbed. Only
//! [`PipelineError::ExtractionEmpty`] and [`PipelineError::NoSentencesFound`]
//! reach the caller.

use crate::agent::{build_prompt, truncate_input, ServiceError, ServiceRequest, SummaryService};
use crate::extract::ExtractedContent;
use crate::extractive::{ExtractiveSummarizer, SummarizeError};
use crate::segment::SentenceSegmenter;
use crate::summary::{LengthTier, SummaryResult};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Content shorter than this is not worth summarizing.
pub const MIN_USABLE_CHARS: usize = 100;

pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PipelineError {
    #[error("not enough content found on this page to summarize ({chars} characters)")]
    ExtractionEmpty { chars: usize },
    #[error("could not parse content into sentences")]
    NoSentencesFound,
}

impl From<SummarizeError> for PipelineError {
    fn from(err: SummarizeError) -> Self {
        match err {
            SummarizeError::NoSentencesFound => PipelineError::NoSentencesFound,
        }
    }
}

/// Per-call summarization settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryRequest {
    pub tier: LengthTier,
    pub prefer_ai: bool,
    /// Bound on the generative call
    pub timeout: Duration,
}

impl SummaryRequest {
    pub fn new(tier: LengthTier) -> Self {
        Self {
            tier,
            prefer_ai: true,
            timeout: GENERATION_TIMEOUT,
        }
    }

    pub fn with_prefer_ai(mut self, prefer_ai: bool) -> Self {
        self.prefer_ai = prefer_ai;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SummaryRequest {
    fn default() -> Self {
        Self::new(LengthTier::default())
    }
}

/// Refuse content too short to summarize.
pub fn ensure_usable(content: &ExtractedContent) -> Result<(), PipelineError> {
    let chars = content.text.trim().chars().count();
    if chars < MIN_USABLE_CHARS {
        return Err(PipelineError::ExtractionEmpty { chars });
    }
    Ok(())
}

/// Check the extracted content, then summarize its text.
pub async fn summarize_content(
    content: &ExtractedContent,
    request: &SummaryRequest,
    service: Option<&dyn SummaryService>,
) -> Result<SummaryResult, PipelineError> {
    ensure_usable(content)?;
    summarize(&content.text, request, service).await
}

/// Summarize `text` with the default extractive fallback.
pub async fn summarize(
    text: &str,
    request: &SummaryRequest,
    service: Option<&dyn SummaryService>,
) -> Result<SummaryResult, PipelineError> {
    summarize_with(&ExtractiveSummarizer::new(), text, request, service).await
}

/// Summarize `text`, falling back to `extractive` when the service is
/// disabled, missing or fails.
#[instrument(skip_all, fields(tier = %request.tier, chars = text.len()))]
pub async fn summarize_with<S: SentenceSegmenter>(
    extractive: &ExtractiveSummarizer<S>,
    text: &str,
    request: &SummaryRequest,
    service: Option<&dyn SummaryService>,
) -> Result<SummaryResult, PipelineError> {
    match service {
        Some(service) if request.prefer_ai => match generate(service, text, request).await {
            Ok(summary) => {
                info!(service = service.name(), "AI summary generated");
                return Ok(SummaryResult::ai(summary));
            }
            Err(err) => {
                warn!(
                    service = service.name(),
                    error = %err,
                    "AI summarization failed, falling back to extractive summary"
                );
            }
        },
        Some(_) => info!("AI summarization disabled, using extractive summary"),
        None => info!("no summarization service available, using extractive summary"),
    }

    let summary = extractive.summarize(text, request.tier)?;
    Ok(SummaryResult::extractive(summary))
}

/// Single service attempt under `request.timeout`; no retries.
async fn generate(
    service: &dyn SummaryService,
    text: &str,
    request: &SummaryRequest,
) -> Result<String, ServiceError> {
    let input = truncate_input(text, service.max_input_chars());
    let service_request = ServiceRequest {
        prompt: build_prompt(&input, request.tier),
        tier: request.tier,
        max_output_tokens: Some(request.tier.output_budget()),
    };

    let text = tokio::time::timeout(request.timeout, service.generate(&service_request))
        .await
        .map_err(|_| ServiceError::Timeout(request.timeout))??;

    let text = text.trim();
    if text.is_empty() {
        return Err(ServiceError::Malformed("empty summary".to_string()));
    }
    Ok(text.to_string())
}
