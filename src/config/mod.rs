use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::validate_and_normalize_url;
use crate::ReindexError;

pub const YOUTUBE_API_KEY_ENV: &str = "YOUTUBE_API_KEY";
pub const YOUTUBE_OAUTH_TOKEN_ENV: &str = "YOUTUBE_OAUTH_TOKEN";
pub const NEWS_API_KEY_ENV: &str = "NEWS_API_KEY";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Credentials for the external services
    pub api: ApiConfig,

    /// Base URLs of the external services
    pub endpoints: EndpointConfig,

    /// Pipeline tuning
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// YouTube Data API key, used for reading video metadata
    pub youtube_api_key: String,

    /// OAuth access token with the youtube scope, required to update a video
    pub youtube_oauth_token: Option<String>,

    /// NewsAPI key
    pub news_api_key: String,

    /// OpenAI API key
    pub openai_api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub youtube_base_url: String,
    pub captions_base_url: String,
    pub news_base_url: String,
    pub openai_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum polarity difference for a headline to count as relevant (exclusive)
    pub relevance_threshold: f64,

    /// Number of transcript characters included in the prompt
    pub transcript_snippet_chars: usize,

    /// Number of headlines kept from the news search
    pub max_headlines: usize,

    /// Chat-completion model
    pub model: String,

    /// Caption track language requested from the captions endpoint
    pub transcript_language: String,

    /// Fetch metadata and transcript at the same time
    pub concurrent_fetch: bool,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            youtube_base_url: "https://www.googleapis.com".to_string(),
            captions_base_url: "https://www.youtube.com".to_string(),
            news_base_url: "https://newsapi.org".to_string(),
            openai_base_url: "https://api.openai.com".to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: 0.2,
            transcript_snippet_chars: 500,
            max_headlines: 5,
            model: "gpt-4".to_string(),
            transcript_language: "en".to_string(),
            concurrent_fetch: false,
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            config
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file without touching the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("trend-reindexer").join("config.yaml"))
    }

    /// Non-empty environment values replace credentials from the file
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = lookup(YOUTUBE_API_KEY_ENV) {
            self.api.youtube_api_key = key;
        }
        if let Some(token) = lookup(YOUTUBE_OAUTH_TOKEN_ENV) {
            self.api.youtube_oauth_token = Some(token);
        }
        if let Some(key) = lookup(NEWS_API_KEY_ENV) {
            self.api.news_api_key = key;
        }
        if let Some(key) = lookup(OPENAI_API_KEY_ENV) {
            self.api.openai_api_key = key;
        }
    }

    /// Validate configuration.
    ///
    /// Credentials are not checked here; each client reports a missing key when it is
    /// first used.
    pub fn validate(&self) -> crate::Result<()> {
        let pipeline = &self.pipeline;

        if !pipeline.relevance_threshold.is_finite()
            || pipeline.relevance_threshold <= 0.0
            || pipeline.relevance_threshold > 2.0
        {
            return Err(ReindexError::Config(format!(
                "relevance_threshold must be in (0, 2], got {}",
                pipeline.relevance_threshold
            )));
        }

        if pipeline.transcript_snippet_chars == 0 {
            return Err(ReindexError::Config(
                "transcript_snippet_chars must be greater than zero".to_string(),
            ));
        }

        if pipeline.max_headlines == 0 {
            return Err(ReindexError::Config(
                "max_headlines must be greater than zero".to_string(),
            ));
        }

        if pipeline.model.trim().is_empty() {
            return Err(ReindexError::Config("model must not be empty".to_string()));
        }

        for (name, url) in [
            ("youtube_base_url", &self.endpoints.youtube_base_url),
            ("captions_base_url", &self.endpoints.captions_base_url),
            ("news_base_url", &self.endpoints.news_base_url),
            ("openai_base_url", &self.endpoints.openai_base_url),
        ] {
            validate_and_normalize_url(url)
                .map_err(|e| ReindexError::Config(format!("{}: {}", name, e)))?;
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  YouTube API Key: {}", mask(&self.api.youtube_api_key));
        println!(
            "  YouTube OAuth Token: {}",
            self.api
                .youtube_oauth_token
                .as_deref()
                .map(mask)
                .unwrap_or_else(|| "(not set)".to_string())
        );
        println!("  News API Key: {}", mask(&self.api.news_api_key));
        println!("  OpenAI API Key: {}", mask(&self.api.openai_api_key));
        println!("  Model: {}", self.pipeline.model);
        println!("  Relevance Threshold: {}", self.pipeline.relevance_threshold);
        println!(
            "  Transcript Snippet: {} chars",
            self.pipeline.transcript_snippet_chars
        );
        println!("  Max Headlines: {}", self.pipeline.max_headlines);
        println!("  Concurrent Fetch: {}", self.pipeline.concurrent_fetch);
    }
}

/// Show only the last four characters of a secret
fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return "(not set)".to_string();
    }
    if count <= 4 {
        return "****".to_string();
    }

    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}
