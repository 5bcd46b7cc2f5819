//! Configuration loading and management for websum.
//!
//! Loads settings from `websum.toml` with environment variable overrides for
//! sensitive data. A missing file means built-in defaults.

use crate::ollama;
use crate::storage::DEFAULT_HISTORY_LIMIT;
use crate::summary::LengthTier;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const CONFIG_FILE: &str = "websum.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing required API key for provider: {0}")]
    MissingApiKey(String),
}

/// Summarization preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Default length tier
    pub length: LengthTier,
    /// Try the generative service before falling back
    pub prefer_ai: bool,
    /// Record each summary in the history log
    pub save_history: bool,
}

/// Generative service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// LLM provider: "ollama", "gemini" or "none"
    pub provider: String,
    /// Model identifier (e.g., "llama3.2:latest", "gemini-2.0-flash")
    pub model: String,
    /// Ollama server address
    pub base_url: String,
    /// Generation call timeout
    pub timeout_secs: u64,
    /// Availability probe timeout
    pub probe_timeout_secs: u64,
}

/// API keys configuration (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub gemini_key: Option<String>,
}

/// Storage paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base path for data storage
    pub path: PathBuf,
    /// Maximum number of history entries kept
    pub history_limit: usize,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from the default location (websum.toml in cwd or home)
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_file() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no config file found, using defaults");
                let mut config = Config::default();
                config.apply_env(|key| std::env::var(key).ok());
                Ok(config)
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        debug!(path = %path.display(), "config loaded");

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override settings from environment variables, read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = var("GEMINI_API_KEY") {
            self.api.gemini_key = Some(key);
        }
        if let Some(url) = var("WEBSUM_OLLAMA_URL") {
            self.agent.base_url = url;
        }
        if let Some(model) = var("WEBSUM_MODEL") {
            self.agent.model = model;
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        let home_config = dirs::home_dir()?
            .join(".config")
            .join("websum")
            .join(CONFIG_FILE);
        home_config.exists().then_some(home_config)
    }

    /// Get the API key for the configured provider
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        match self.agent.provider.trim().to_ascii_lowercase().as_str() {
            "gemini" => self
                .api
                .gemini_key
                .as_deref()
                .ok_or_else(|| ConfigError::MissingApiKey("gemini".to_string())),
            other => Err(ConfigError::MissingApiKey(other.to_string())),
        }
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.agent.timeout_secs.max(1))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.agent.probe_timeout_secs.max(1))
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            length: LengthTier::Medium,
            prefer_ai: true,
            save_history: true,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: ollama::DEFAULT_MODEL.to_string(),
            base_url: ollama::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
            probe_timeout_secs: 3,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let path = dirs::data_local_dir()
            .map(|dir| dir.join("websum"))
            .unwrap_or_else(|| PathBuf::from("./data"));
        Self {
            path,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_prefer_local_ollama() {
        let config = Config::default();
        assert_eq!(config.agent.provider, "ollama");
        assert_eq!(config.summary.length, LengthTier::Medium);
        assert!(config.summary.prefer_ai);
        assert_eq!(config.storage.history_limit, 50);
        assert_eq!(config.generation_timeout(), Duration::from_secs(60));
        assert_eq!(config.probe_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[summary]
length = "short"
prefer_ai = false

[agent]
provider = "gemini"
model = "gemini-2.5-flash"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.summary.length, LengthTier::Short);
        assert!(!config.summary.prefer_ai);
        assert!(config.summary.save_history);
        assert_eq!(config.agent.model, "gemini-2.5-flash");
        assert_eq!(config.agent.timeout_secs, 60);
        assert_eq!(config.storage.history_limit, 50);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[summary\nlength = ").unwrap();
        assert!(matches!(
            Config::load_from(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", " secret "),
            ("WEBSUM_OLLAMA_URL", "http://gpu-box:11434"),
            ("WEBSUM_MODEL", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.api.gemini_key.as_deref(), Some("secret"));
        assert_eq!(config.agent.base_url, "http://gpu-box:11434");
        assert_eq!(config.agent.model, ollama::DEFAULT_MODEL);
    }

    #[test]
    fn api_key_requires_gemini_key() {
        let mut config = Config::default();
        config.agent.provider = "gemini".into();
        assert!(matches!(config.api_key(), Err(ConfigError::MissingApiKey(_))));
        config.api.gemini_key = Some("k".into());
        assert_eq!(config.api_key().unwrap(), "k");
    }
}
