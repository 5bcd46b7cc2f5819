//! Extractive summarization.
//!
//! Picks the highest scoring sentences of a text and returns them in reading
//! order. Scores combine word frequency, position in the document and a few
//! information-density signals. Fully deterministic: the same text and tier
//! always produce the same summary.

use crate::lexicon::Lexicon;
use crate::segment::{RegexSegmenter, SentenceSegmenter};
use crate::summary::LengthTier;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"\w+").unwrap();
    static ref CAPITALIZED_RE: Regex = Regex::new(r"[A-Z][a-z]+").unwrap();
}

/// Documents with more sentences than this get position weighting.
const POSITION_MIN_SENTENCES: usize = 5;
const LEAD_WEIGHT: f64 = 1.3;
const TAIL_WEIGHT: f64 = 1.2;
const BODY_WEIGHT: f64 = 0.9;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("could not parse content into sentences")]
    NoSentencesFound,
}

/// Normalized word → occurrences within one text.
pub type WordFrequencyTable = HashMap<String, usize>;

/// A sentence with its score and position in the segmented sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSentence<'t> {
    /// Trimmed sentence text, borrowed from the input.
    pub text: &'t str,
    pub score: f64,
    pub index: usize,
}

/// Frequency-based sentence ranker with a pluggable segmenter.
#[derive(Debug, Clone)]
pub struct ExtractiveSummarizer<S = RegexSegmenter> {
    segmenter: S,
    lexicon: Lexicon,
}

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self::with_parts(RegexSegmenter, Lexicon::default())
    }
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SentenceSegmenter> ExtractiveSummarizer<S> {
    pub fn with_parts(segmenter: S, lexicon: Lexicon) -> Self {
        Self { segmenter, lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Summarize `text`, keeping at most `tier.sentence_cap()` sentences.
    pub fn summarize(&self, text: &str, tier: LengthTier) -> Result<String, SummarizeError> {
        let scored = self.score_sentences(text)?;
        let total = scored.len();
        let selected = select_top(scored, tier.sentence_cap());

        debug!(
            tier = %tier,
            sentences = total,
            selected = selected.len(),
            "extractive summary built"
        );

        Ok(selected
            .iter()
            .map(|s| s.text)
            .collect::<Vec<_>>()
            .join(" "))
    }

    /// Segment and score every sentence of `text`, in reading order.
    pub fn score_sentences<'t>(
        &self,
        text: &'t str,
    ) -> Result<Vec<ScoredSentence<'t>>, SummarizeError> {
        let sentences = self.segmenter.segment(text);
        if sentences.is_empty() {
            return Err(SummarizeError::NoSentencesFound);
        }

        let frequencies = self.word_frequencies(text);
        let total = sentences.len();

        Ok(sentences
            .into_iter()
            .enumerate()
            .map(|(index, sentence)| {
                let score = base_score(sentence, &frequencies)
                    * position_weight(index, total)
                    * density_weight(sentence, &self.lexicon);
                ScoredSentence {
                    text: sentence.trim(),
                    score,
                    index,
                }
            })
            .collect())
    }

    /// Count lowercase words longer than two characters that are not stop words.
    pub fn word_frequencies(&self, text: &str) -> WordFrequencyTable {
        let mut table = WordFrequencyTable::new();
        for word in words(text) {
            if word.chars().count() > 2 && !self.lexicon.is_stop_word(&word) {
                *table.entry(word).or_insert(0) += 1;
            }
        }
        table
    }
}

/// Lowercased `\w+` tokens of `text`.
fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD_RE.find_iter(text).map(|m| m.as_str().to_lowercase())
}

/// Mean frequency over all of the sentence's tokens; unknown words count 0.
fn base_score(sentence: &str, frequencies: &WordFrequencyTable) -> f64 {
    let mut count = 0usize;
    let mut sum = 0usize;
    for word in words(sentence) {
        count += 1;
        sum += frequencies.get(&word).copied().unwrap_or(0);
    }
    if count == 0 {
        return 0.0;
    }
    sum as f64 / count as f64
}

/// Leads and conclusions carry more weight once a text has enough sentences.
pub fn position_weight(index: usize, total: usize) -> f64 {
    if total <= POSITION_MIN_SENTENCES {
        return 1.0;
    }
    if index < 3 {
        LEAD_WEIGHT
    } else if index + 3 >= total {
        TAIL_WEIGHT
    } else {
        BODY_WEIGHT
    }
}

/// Bonus for numbers, proper nouns, salience keywords and moderate length.
pub fn density_weight(sentence: &str, lexicon: &Lexicon) -> f64 {
    let mut weight = 1.0;
    if sentence.chars().any(|c| c.is_ascii_digit()) {
        weight += 0.2;
    }
    if CAPITALIZED_RE.find_iter(sentence).count() > 2 {
        weight += 0.1;
    }
    if words(sentence).any(|w| lexicon.is_salient(&w)) {
        weight += 0.3;
    }
    let length = sentence.chars().count();
    if length > 100 && length < 200 {
        weight += 0.1;
    }
    weight
}

/// Keep the `cap` best sentences, returned in their original order.
///
/// Ranking is a stable sort on score descending with ties broken by index,
/// so equal scores always favour the earlier sentence.
pub fn select_top(mut scored: Vec<ScoredSentence<'_>>, cap: usize) -> Vec<ScoredSentence<'_>> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    scored.truncate(cap.min(scored.len()));
    scored.sort_by_key(|s| s.index);
    scored
}

/// Summarize with the default segmenter and word lists.
pub fn generate_extractive_summary(text: &str, tier: LengthTier) -> Result<String, SummarizeError> {
    ExtractiveSummarizer::new().summarize(text, tier)
}
