//! # websum
//!
//! Summarise web pages from the command line.
//!
//! ## Features
//!
//! - **Main content extraction**: picks the article region of a noisy page and normalizes its text
//! - **AI summaries**: local Ollama or Gemini, at short, medium or long length
//! - **Extractive fallback**: deterministic sentence ranking when no service answers
//! - **History**: the last 50 summaries, stored in sled

pub mod agent;
pub mod config;
pub mod extract;
pub mod extractive;
pub mod lexicon;
pub mod ollama;
pub mod pipeline;
pub mod scraper;
pub mod segment;
pub mod storage;
pub mod summary;

pub use config::Config;
pub use extract::{extract_content, ExtractedContent};
pub use extractive::{generate_extractive_summary, ExtractiveSummarizer};
pub use pipeline::{summarize, summarize_content, PipelineError, SummaryRequest};
pub use storage::Storage;
pub use summary::{LengthTier, SummaryMethod, SummaryResult};
