/*!
common/src/lib.rs

Shared configuration types and secret loading for feedlens.

This file provides:
- Config data structures (deserialized from TOML, every field defaulted)
- An async loader that merges a default file with an optional override
- Resolution of the two required API keys from the environment
*/

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// HTTP server configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the web UI binds to (e.g. "127.0.0.1")
    pub bind: String,
    pub port: u16,
    /// Sessions untouched for this long are dropped from memory
    pub session_ttl_minutes: u64,
    /// Upper bound on sessions held in memory; the least recently seen go first
    pub max_sessions: usize,
}

impl ServerConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_minutes.saturating_mul(60))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
            session_ttl_minutes: 120,
            max_sessions: 10_000,
        }
    }
}

/// News search service configuration (NewsAPI-compatible `everything` endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub api_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub language: String,
    pub sort_by: String,
    /// Results requested per search; the service caps this at 100
    pub page_size: u32,
    pub timeout_seconds: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_url: "https://newsapi.org/v2/everything".to_string(),
            api_key_env: "NEWS_API_KEY".to_string(),
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
            page_size: 50,
            timeout_seconds: 20,
        }
    }
}

/// Summarization service configuration (Google Generative Language API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL; the public endpoint when unset
    pub api_url: Option<String>,
    pub api_key_env: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tokens: usize,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_seconds: 30,
            max_tokens: 500,
            temperature: 0.5,
        }
    }
}

/// Article page fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Paragraph text shorter than this is treated as a failed extraction
    pub min_content_chars: usize,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            min_content_chars: 200,
        }
    }
}

/// Ranking and display policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Articles must score strictly above this percentage to be kept
    pub min_score: f64,
    /// Number of ranked articles rendered
    pub display_limit: usize,
    /// Prefilled value of the interests field
    pub default_interests: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            min_score: 20.0,
            display_limit: 10,
            default_interests: "AI, Startups, Hyderabad".to_string(),
        }
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub news: NewsConfig,
    pub llm: LlmConfig,
    pub scraping: ScrapingConfig,
    pub feed: FeedConfig,
}

impl Config {
    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    /// With neither, the built-in defaults are returned.
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for path in [default_path, override_path].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would only fail later, at request time.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.news.api_url)
            .with_context(|| format!("news.api_url is not a valid URL: {}", self.news.api_url))?;
        if let Some(api_url) = &self.llm.api_url {
            Url::parse(api_url).with_context(|| format!("llm.api_url is not a valid URL: {}", api_url))?;
        }
        if self.server.max_sessions == 0 {
            bail!("server.max_sessions must be at least 1");
        }
        if self.news.page_size == 0 || self.news.page_size > 100 {
            bail!("news.page_size must be between 1 and 100, got {}", self.news.page_size);
        }
        if !(0.0..=100.0).contains(&self.feed.min_score) {
            bail!("feed.min_score must be a percentage, got {}", self.feed.min_score);
        }
        Ok(())
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// The two credentials the application cannot start without.
#[derive(Clone)]
pub struct Secrets {
    pub news_api_key: String,
    pub llm_api_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("news_api_key", &"<redacted>")
            .field("llm_api_key", &"<redacted>")
            .finish()
    }
}

impl Secrets {
    /// Read both keys from the environment variables named in `config`.
    pub fn from_env(config: &Config) -> Result<Self> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Resolve both keys through `lookup`. Blank values count as missing, and the
    /// error names every missing variable at once.
    pub fn from_lookup<F>(config: &Config, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let news = fetch(&config.news.api_key_env);
        let llm = fetch(&config.llm.api_key_env);

        match (news, llm) {
            (Some(news_api_key), Some(llm_api_key)) => Ok(Self { news_api_key, llm_api_key }),
            (news, llm) => {
                let mut missing = Vec::new();
                if news.is_none() {
                    missing.push(config.news.api_key_env.as_str());
                }
                if llm.is_none() {
                    missing.push(config.llm.api_key_env.as_str());
                }
                bail!("API keys not found! Set {} in the environment or a .env file", missing.join(" and "))
            }
        }
    }
}
