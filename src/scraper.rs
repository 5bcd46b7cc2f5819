//! Document source: fetches or reads HTML and parses it into a [`PageDocument`].
//!
//! Uses reqwest for fetching and scraper for HTML parsing. Nothing here looks
//! for main content; that is the job of [`crate::extract`].

use reqwest::Client;
use scraper::Html;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// User-Agent string identifying this scraper
const USER_AGENT: &str = concat!("websum/", env!("CARGO_PKG_VERSION"));

/// Default timeout for HTTP requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),
    #[error("failed to read file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("no content found at {0}")]
    NoContent(String),
}

/// A parsed page plus the location it came from. Read-only.
pub struct PageDocument {
    html: Html,
    url: String,
}

impl PageDocument {
    pub fn parse(html: &str, url: impl Into<String>) -> Self {
        Self {
            html: Html::parse_document(html),
            url: url.into(),
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Create a configured HTTP client for scraping
fn create_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Fetch a URL and parse the response body
pub async fn fetch_document(url: &str) -> Result<PageDocument, ScraperError> {
    let client = create_client()?;

    info!(url, "fetching page");
    let response = client.get(url).send().await?.error_for_status()?;
    let html = response.text().await?;
    debug!(url, bytes = html.len(), "page fetched");

    if html.trim().is_empty() {
        return Err(ScraperError::NoContent(url.to_string()));
    }

    Ok(PageDocument::parse(&html, url))
}

/// Read a local HTML file; its location becomes a `file://` URL
pub fn read_document(path: &Path) -> Result<PageDocument, ScraperError> {
    let html = std::fs::read_to_string(path)?;
    let location = match std::fs::canonicalize(path) {
        Ok(absolute) => format!("file://{}", absolute.display()),
        Err(_) => format!("file://{}", path.display()),
    };

    if html.trim().is_empty() {
        return Err(ScraperError::NoContent(location));
    }

    Ok(PageDocument::parse(&html, location))
}

/// Load from `source`, treating http(s) URLs as remote and anything else as a path
pub async fn load_document(source: &str) -> Result<PageDocument, ScraperError> {
    if is_remote(source) {
        fetch_document(source).await
    } else {
        read_document(Path::new(source))
    }
}

fn is_remote(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use std::io::Write;
    use std::net::SocketAddr;

    #[test]
    fn remote_sources_are_detected() {
        assert!(is_remote("https://example.org/a"));
        assert!(is_remote("HTTP://example.org"));
        assert!(!is_remote("./page.html"));
        assert!(!is_remote("/tmp/https-notes.html"));
    }

    #[test]
    fn reads_local_file_as_file_url() {
        let mut file = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
        write!(file, "<html><head><title>Local</title></head><body><p>Hi.</p></body></html>")
            .unwrap();

        let doc = read_document(file.path()).unwrap();
        assert!(doc.url().starts_with("file://"));
    }

    #[test]
    fn empty_file_has_no_content() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            read_document(file.path()),
            Err(ScraperError::NoContent(_))
        ));
    }

    #[tokio::test]
    async fn fetches_and_parses_remote_page() {
        let app = Router::new().route(
            "/",
            get(|| async {
                axum::response::Html("<html><head><title>Served</title></head><body></body></html>")
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let url = format!("http://{}/", addr);
        let doc = load_document(&url).await.unwrap();
        assert_eq!(doc.url(), url);
        let title = scraper::Selector::parse("title").unwrap();
        assert_eq!(doc.html().select(&title).count(), 1);
    }

    #[tokio::test]
    async fn http_errors_are_reported() {
        let app = Router::new();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let result = fetch_document(&format!("http://{}/missing", addr)).await;
        assert!(matches!(result, Err(ScraperError::FetchError(_))));
    }
}
