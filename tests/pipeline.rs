//! End-to-end: HTML page → extraction → summary.

use async_trait::async_trait;
use websum::agent::{ServiceError, ServiceRequest, SummaryService};
use websum::extract::ContentSource;
use websum::scraper::PageDocument;
use websum::{
    extract_content, summarize_content, LengthTier, PipelineError, SummaryMethod, SummaryRequest,
};

struct Offline;

#[async_trait]
impl SummaryService for Offline {
    fn name(&self) -> &str {
        "offline"
    }

    fn max_input_chars(&self) -> usize {
        8_000
    }

    async fn generate(&self, _request: &ServiceRequest) -> Result<String, ServiceError> {
        Err(ServiceError::Transport("connection refused".to_string()))
    }

    async fn probe(&self) -> Result<Vec<String>, ServiceError> {
        Err(ServiceError::Transport("connection refused".to_string()))
    }
}

fn article_page(paragraphs: usize) -> String {
    let body: String = (0..paragraphs)
        .map(|i| {
            format!(
                "<p>Section {i} of the report describes how the regional water authority \
                 upgraded pumping station number {i}. Engineers replaced worn valves.</p>"
            )
        })
        .collect();
    format!(
        r#"<html>
<head><title>Water Authority Report</title>
<meta name="description" content="Annual infrastructure report"></head>
<body>
<nav><a href="/">Home</a><a href="/about">About</a></nav>
<main><article>{body}</article></main>
<footer>Copyright notice and links</footer>
<script>window.tracking = "ignore me";</script>
</body>
</html>"#
    )
}

#[tokio::test]
async fn offline_service_yields_extractive_summary_of_article() {
    let doc = PageDocument::parse(&article_page(15), "https://water.example.gov/report");
    let content = extract_content(&doc);

    assert_eq!(content.source, ContentSource::Region(0));
    assert_eq!(content.title, "Water Authority Report");
    assert_eq!(content.metadata.description, "Annual infrastructure report");
    assert_eq!(content.metadata.domain, "water.example.gov");
    assert!(!content.text.contains("Copyright"));
    assert!(!content.text.contains("tracking"));

    let request = SummaryRequest::new(LengthTier::Short);
    let result = summarize_content(&content, &request, Some(&Offline))
        .await
        .unwrap();

    assert_eq!(result.method, SummaryMethod::Extractive);
    // 30 sentences in the article; the short tier keeps 8.
    assert_eq!(result.text.matches(". ").count() + 1, 8);
    for sentence in result.text.split_inclusive(". ") {
        assert!(content.text.contains(sentence.trim()));
    }
}

#[tokio::test]
async fn longer_tiers_keep_more_sentences() {
    let doc = PageDocument::parse(&article_page(15), "https://water.example.gov/report");
    let content = extract_content(&doc);

    let mut previous = 0;
    for tier in [LengthTier::Short, LengthTier::Medium, LengthTier::Long] {
        let result = summarize_content(&content, &SummaryRequest::new(tier), None)
            .await
            .unwrap();
        let words = result.word_count();
        assert!(words > previous, "{tier} should be longer than the tier before");
        previous = words;
    }
}

#[tokio::test]
async fn nearly_empty_page_is_rejected() {
    let doc = PageDocument::parse(
        "<html><head><title>Empty</title></head><body><p>Coming soon.</p></body></html>",
        "https://example.org/soon",
    );
    let content = extract_content(&doc);
    assert_eq!(content.source, ContentSource::FullDocument);

    let err = summarize_content(&content, &SummaryRequest::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::ExtractionEmpty { .. }));
}
