//! Ollama backend, spoken to over its HTTP API.

use crate::agent::{ServiceError, ServiceRequest, SummaryService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2:latest";

/// Local models get a smaller input budget than hosted ones.
const MAX_INPUT_CHARS: usize = 8_000;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    request_timeout: Duration,
    probe_timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(concat!("websum/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let base_url = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            base_url.trim().trim_end_matches('/').to_string()
        };

        Ok(Self {
            client,
            base_url,
            model: normalize_model(model),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        })
    }

    pub fn with_timeouts(mut self, request: Duration, probe: Duration) -> Self {
        self.request_timeout = request;
        self.probe_timeout = probe;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ServiceError::from_status(status.as_u16(), body))
    }
}

#[async_trait]
impl SummaryService for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn max_input_chars(&self) -> usize {
        MAX_INPUT_CHARS
    }

    async fn generate(&self, request: &ServiceRequest) -> Result<String, ServiceError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: request
                .max_output_tokens
                .map(|num_predict| GenerateOptions { num_predict }),
        };

        debug!(
            model = %self.model,
            prompt_chars = request.prompt.len(),
            "sending ollama generate request"
        );

        let resp = self
            .client
            .post(self.endpoint("api/generate"))
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify(e, self.request_timeout))?;
        let resp = Self::check_status(resp).await?;

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| classify(e, self.request_timeout))?;

        match parsed.response {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(ServiceError::Malformed("no response from Ollama".to_string())),
        }
    }

    async fn probe(&self) -> Result<Vec<String>, ServiceError> {
        let resp = self
            .client
            .get(self.endpoint("api/tags"))
            .timeout(self.probe_timeout)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| classify(e, self.probe_timeout))?;
        let resp = Self::check_status(resp).await?;

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| classify(e, self.probe_timeout))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

/// Model names without a tag refer to `:latest`.
pub fn normalize_model(model: &str) -> String {
    let model = model.trim();
    if model.is_empty() {
        DEFAULT_MODEL.to_string()
    } else if model.contains(':') {
        model.to_string()
    } else {
        format!("{model}:latest")
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout(timeout)
    } else if err.is_decode() {
        ServiceError::Malformed(err.to_string())
    } else {
        ServiceError::Transport(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::LengthTier;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::net::SocketAddr;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn request() -> ServiceRequest {
        ServiceRequest {
            prompt: "Summarize: the harbour expanded.".to_string(),
            tier: LengthTier::Short,
            max_output_tokens: Some(256),
        }
    }

    #[test]
    fn model_names_get_latest_tag() {
        assert_eq!(normalize_model("llama3.2"), "llama3.2:latest");
        assert_eq!(normalize_model("qwen2.5:3b"), "qwen2.5:3b");
        assert_eq!(normalize_model("  "), DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn generate_returns_trimmed_response() {
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["stream"], json!(false));
                assert_eq!(body["options"]["num_predict"], json!(256));
                let model = body["model"].as_str().unwrap_or_default().to_string();
                Json(json!({ "response": format!("  summary by {model}\n") }))
            }),
        );
        let base = serve(app).await;

        let client = OllamaClient::new(&base, "llama3.2").unwrap();
        let text = client.generate(&request()).await.unwrap();
        assert_eq!(text, "summary by llama3.2:latest");
    }

    #[tokio::test]
    async fn error_statuses_are_classified() {
        let app = Router::new()
            .route(
                "/a/api/generate",
                post(|| async { (StatusCode::UNAUTHORIZED, "no") }),
            )
            .route(
                "/b/api/generate",
                post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
            )
            .route(
                "/c/api/generate",
                post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );
        let base = serve(app).await;

        let auth = OllamaClient::new(&format!("{base}/a"), "m").unwrap();
        assert!(matches!(
            auth.generate(&request()).await,
            Err(ServiceError::Auth(_))
        ));

        let limited = OllamaClient::new(&format!("{base}/b"), "m").unwrap();
        assert!(matches!(
            limited.generate(&request()).await,
            Err(ServiceError::RateLimited(_))
        ));

        let broken = OllamaClient::new(&format!("{base}/c"), "m").unwrap();
        match broken.generate(&request()).await {
            Err(ServiceError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_response_field_is_malformed() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { Json(json!({ "done": true })) }),
        );
        let base = serve(app).await;

        let client = OllamaClient::new(&base, "m").unwrap();
        assert!(matches!(
            client.generate(&request()).await,
            Err(ServiceError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "response": "late" }))
            }),
        );
        let base = serve(app).await;

        let client = OllamaClient::new(&base, "m")
            .unwrap()
            .with_timeouts(Duration::from_millis(100), Duration::from_millis(100));
        assert!(matches!(
            client.generate(&request()).await,
            Err(ServiceError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn probe_lists_models() {
        let app = Router::new().route(
            "/api/tags",
            get(|| async {
                Json(json!({ "models": [{ "name": "llama3.2:latest" }, { "name": "phi3:mini" }] }))
            }),
        );
        let base = serve(app).await;

        let client = OllamaClient::new(&format!("{base}/"), "m").unwrap();
        assert_eq!(client.base_url(), base);
        let models = client.probe().await.unwrap();
        assert_eq!(models, vec!["llama3.2:latest", "phi3:mini"]);
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OllamaClient::new(&format!("http://{addr}"), "m").unwrap();
        assert!(matches!(
            client.probe().await,
            Err(ServiceError::Transport(_))
        ));
    }
}
