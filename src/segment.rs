//! Sentence segmentation strategies.
//!
//! The default splitter is a regex heuristic: it drops trailing text with no
//! terminal punctuation and splits on abbreviations and decimals. Stricter
//! boundary detection can be plugged in through [`SentenceSegmenter`]
//! without touching the scorer.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SENTENCE_RE: Regex = Regex::new(r"[^.!?]+[.!?]+").unwrap();
}

/// Splits text into sentences, in reading order.
///
/// Returned slices must borrow from `text` so callers can rely on every
/// sentence being a verbatim substring of the input.
pub trait SentenceSegmenter: Send + Sync {
    fn segment<'t>(&self, text: &'t str) -> Vec<&'t str>;
}

/// Runs of non-terminator characters followed by one or more of `.`, `!`, `?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexSegmenter;

impl SentenceSegmenter for RegexSegmenter {
    fn segment<'t>(&self, text: &'t str) -> Vec<&'t str> {
        SENTENCE_RE.find_iter(text).map(|m| m.as_str()).collect()
    }
}
