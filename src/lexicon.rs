//! Word lists used by the extractive scorer.

use std::collections::HashSet;

/// Common function words ignored when building the frequency table.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "must", "can", "this", "that", "these", "those",
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them", "my", "your",
    "his", "its", "our", "their",
];

/// Words that mark a sentence as likely to carry a finding.
pub const SALIENCE_KEYWORDS: &[&str] = &[
    "important",
    "significant",
    "key",
    "main",
    "primary",
    "essential",
    "critical",
    "major",
    "research",
    "study",
    "data",
    "result",
    "conclusion",
    "finding",
];

/// Stop words and salience keywords, stored lowercase.
#[derive(Debug, Clone)]
pub struct Lexicon {
    stop_words: HashSet<String>,
    salience: HashSet<String>,
}

impl Lexicon {
    pub fn new<S, K>(stop_words: S, salience: K) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        Self {
            stop_words: stop_words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
            salience: salience
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// `word` must already be lowercase.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// `word` must already be lowercase.
    pub fn is_salient(&self, word: &str) -> bool {
        self.salience.contains(word)
    }

    pub fn stop_word_count(&self) -> usize {
        self.stop_words.len()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(STOP_WORDS.iter(), SALIENCE_KEYWORDS.iter())
    }
}
