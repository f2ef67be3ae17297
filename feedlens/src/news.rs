use anyhow::{Context, Result};
use chrono::DateTime;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

use crate::topics::build_query;

/// A news article as returned by the search service. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Unique key within one fetch
    pub url: String,
    pub source_name: String,
    /// ISO-8601 timestamp as sent by the service
    pub published_at: String,
}

impl Article {
    /// Calendar date of publication (`YYYY-MM-DD`).
    pub fn published_date(&self) -> String {
        match DateTime::parse_from_rfc3339(&self.published_at) {
            Ok(ts) => ts.format("%Y-%m-%d").to_string(),
            Err(_) => self.published_at.chars().take(10).collect(),
        }
    }
}

/// A searchable news service.
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    /// One search for articles mentioning any of `topics`, newest first.
    async fn search(&self, topics: &[String]) -> Result<Vec<Article>>;
}

/// Client for the NewsAPI `everything` endpoint.
pub struct NewsApiClient {
    api_url: String,
    api_key: String,
    language: String,
    sort_by: String,
    page_size: u32,
    client: Client,
}

impl NewsApiClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("feedlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
            page_size: 50,
            client,
        })
    }

    pub fn with_filters(mut self, language: impl Into<String>, sort_by: impl Into<String>, page_size: u32) -> Self {
        self.language = language.into();
        self.sort_by = sort_by.into();
        self.page_size = page_size;
        self
    }
}

#[async_trait::async_trait]
impl NewsSource for NewsApiClient {
    async fn search(&self, topics: &[String]) -> Result<Vec<Article>> {
        let query = build_query(topics);
        let page_size = self.page_size.to_string();
        debug!(%query, "news: searching");

        let response = self
            .client
            .get(&self.api_url)
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", query.as_str()),
                ("language", self.language.as_str()),
                ("sortBy", self.sort_by.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .context("news search request failed")?;

        let status = response.status();
        let body = response.text().await.context("failed to read news search response")?;

        // Error bodies carry a readable message; prefer it over the bare status.
        let parsed: NewsApiResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => {
                return Err(anyhow::Error::new(e).context("failed to parse news search response"));
            }
            Err(_) => anyhow::bail!("news API error {}: {}", status, body),
        };

        if !status.is_success() || parsed.status != "ok" {
            anyhow::bail!(
                "news API error {} ({}): {}",
                status,
                parsed.code.as_deref().unwrap_or("unknown"),
                parsed.message.as_deref().unwrap_or("no message")
            );
        }

        let total = parsed.articles.len();
        let articles = dedupe_by_url(parsed.articles);
        info!(query = %query, received = total, kept = articles.len(), "news: search complete");
        Ok(articles)
    }
}

/// Convert raw records, dropping those without a url and later repeats of a url.
fn dedupe_by_url(raw: Vec<RawArticle>) -> Vec<Article> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|r| {
            let url = r.url.filter(|u| !u.trim().is_empty())?;
            if !seen.insert(url.clone()) {
                return None;
            }
            Some(Article {
                title: r.title,
                description: r.description,
                url,
                source_name: r
                    .source
                    .and_then(|s| s.name)
                    .unwrap_or_else(|| "Unknown source".to_string()),
                published_at: r.published_at.unwrap_or_default(),
            })
        })
        .collect()
}

// NewsAPI response structures
#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(default)]
    name: Option<String>,
}
