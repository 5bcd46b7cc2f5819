//! Main content extraction.
//!
//! Finds the part of a page that holds its article text, normalizes it and
//! gathers basic page metadata. Three strategies, first match wins:
//!
//! 1. the first well-known content region with more than 200 characters
//! 2. the text of paragraphs, headings, list items, quotes, code and cells
//! 3. the whole document body

use crate::scraper::PageDocument;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Regions probed for main content, most specific first.
pub const CONTENT_SELECTORS: &[&str] = &[
    "main article",
    "main",
    "article",
    "[role=\"main\"]",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".content-body",
    ".post-body",
    "#content",
    ".main-content",
    ".page-content",
];

/// Elements gathered when no region qualifies.
pub const STRUCTURAL_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, li, blockquote, pre, td";

/// A region or fallback must carry more than this many characters.
pub const MIN_REGION_CHARS: usize = 200;

/// Normalized text is cut to this many characters.
pub const MAX_CONTENT_CHARS: usize = 10_000;

pub const UNTITLED: &str = "Untitled Page";

/// Elements whose text never counts as page content.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

lazy_static! {
    static ref DISALLOWED_RE: Regex = Regex::new(r#"[^\w\s.,!?;:()\-"']"#).unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref CONTENT_SELECTORS_PARSED: Vec<Selector> = CONTENT_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect();
    static ref STRUCTURAL: Selector = Selector::parse(STRUCTURAL_SELECTOR).unwrap();
    static ref BODY: Selector = Selector::parse("body").unwrap();
    static ref TITLE: Selector = Selector::parse("title").unwrap();
    static ref H1: Selector = Selector::parse("h1").unwrap();
    static ref META_DESCRIPTION: Selector =
        Selector::parse("meta[name=\"description\"]").unwrap();
    static ref OG_DESCRIPTION: Selector =
        Selector::parse("meta[property=\"og:description\"]").unwrap();
    static ref META_AUTHOR: Selector = Selector::parse("meta[name=\"author\"]").unwrap();
    static ref REL_AUTHOR: Selector = Selector::parse("[rel=\"author\"]").unwrap();
}

/// Where the extracted text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// A content region, by index into [`CONTENT_SELECTORS`]
    Region(usize),
    Structural,
    FullDocument,
}

/// Secondary page details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub description: String,
    pub author: String,
    /// Host part of the page URL, empty for non-URL locations
    pub domain: String,
}

/// Normalized main content of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub text: String,
    pub title: String,
    pub url: String,
    pub word_count: usize,
    pub source: ContentSource,
    pub metadata: PageMetadata,
}

/// Extract and normalize the main content of `document`.
pub fn extract_content(document: &PageDocument) -> ExtractedContent {
    let html = document.html();
    let (raw, source) = locate_content(html);
    let text = clean_content(&raw);
    let word_count = text.split_whitespace().count();

    debug!(
        url = document.url(),
        ?source,
        chars = text.chars().count(),
        word_count,
        "content extracted"
    );

    ExtractedContent {
        text,
        title: extract_title(html),
        url: document.url().to_string(),
        word_count,
        source,
        metadata: extract_metadata(html, document.url()),
    }
}

/// Pick the raw (un-normalized) content text.
fn locate_content(html: &Html) -> (String, ContentSource) {
    for (index, selector) in CONTENT_SELECTORS_PARSED.iter().enumerate() {
        if let Some(element) = html.select(selector).next() {
            let text = text_content(element);
            if char_len(text.trim()) > MIN_REGION_CHARS {
                return (text, ContentSource::Region(index));
            }
        }
    }

    let structural = html
        .select(&STRUCTURAL)
        .map(text_content)
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if char_len(structural.trim()) >= MIN_REGION_CHARS {
        return (structural, ContentSource::Structural);
    }

    let full = match html.select(&BODY).next() {
        Some(body) => text_content(body),
        None => text_content(html.root_element()),
    };
    (full, ContentSource::FullDocument)
}

/// Concatenated text nodes under `element`, skipping scripts and styles.
pub fn text_content(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| NON_CONTENT_TAGS.contains(&el.name()))
        });
        if !hidden {
            out.push_str(text);
        }
    }
    out
}

/// Normalize extracted text.
///
/// Characters outside word characters, whitespace and basic punctuation
/// become spaces, whitespace runs collapse to one space, and the result is
/// trimmed and cut to [`MAX_CONTENT_CHARS`]. The cut may split a word.
pub fn clean_content(raw: &str) -> String {
    let allowed = DISALLOWED_RE.replace_all(raw, " ");
    let collapsed = WHITESPACE_RE.replace_all(&allowed, " ");
    truncate_chars(collapsed.trim(), MAX_CONTENT_CHARS).to_string()
}

/// Page title from `<title>`, else the first `<h1>`, else a placeholder.
pub fn extract_title(html: &Html) -> String {
    first_text(html, &TITLE)
        .or_else(|| first_text(html, &H1))
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn extract_metadata(html: &Html, location: &str) -> PageMetadata {
    let description = meta_content(html, &META_DESCRIPTION)
        .or_else(|| meta_content(html, &OG_DESCRIPTION))
        .unwrap_or_default();
    let author = meta_content(html, &META_AUTHOR)
        .or_else(|| first_text(html, &REL_AUTHOR))
        .unwrap_or_default();
    let domain = url::Url::parse(location)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();

    PageMetadata {
        description,
        author,
        domain,
    }
}

fn first_text(html: &Html, selector: &Selector) -> Option<String> {
    html.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn meta_content(html: &Html, selector: &Selector) -> Option<String> {
    html.select(selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
