//! Summary types shared by the extractive and generative paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown summary length '{0}' (expected short, medium or long)")]
pub struct ParseTierError(String);

/// Requested summary length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthTier {
    Short,
    #[default]
    Medium,
    Long,
}

impl LengthTier {
    /// Maximum number of sentences the extractive path keeps for this tier.
    pub fn sentence_cap(self) -> usize {
        match self {
            LengthTier::Short => 8,
            LengthTier::Medium => 12,
            LengthTier::Long => 20,
        }
    }

    /// Output token budget handed to generative services.
    pub fn output_budget(self) -> u32 {
        match self {
            LengthTier::Short => 256,
            LengthTier::Medium => 512,
            LengthTier::Long => 1024,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LengthTier::Short => "short",
            LengthTier::Medium => "medium",
            LengthTier::Long => "long",
        }
    }
}

impl fmt::Display for LengthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthTier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(LengthTier::Short),
            "medium" => Ok(LengthTier::Medium),
            "long" => Ok(LengthTier::Long),
            _ => Err(ParseTierError(s.to_string())),
        }
    }
}

/// Which path produced a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMethod {
    Ai,
    Extractive,
}

impl SummaryMethod {
    /// Human-facing label shown next to a summary
    pub fn label(self) -> &'static str {
        match self {
            SummaryMethod::Ai => "AI Summary",
            SummaryMethod::Extractive => "Data Extraction",
        }
    }
}

/// Final output of one summarization request.
///
/// `text` from the AI path may carry whatever markup the service chose;
/// extractive text is always plain sentences joined by single spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub text: String,
    pub method: SummaryMethod,
}

impl SummaryResult {
    pub fn ai(text: String) -> Self {
        Self {
            text,
            method: SummaryMethod::Ai,
        }
    }

    pub fn extractive(text: String) -> Self {
        Self {
            text,
            method: SummaryMethod::Extractive,
        }
    }

    /// Number of whitespace-delimited words in the summary
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Check if the summary has any content
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
