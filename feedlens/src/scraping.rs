use anyhow::{Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Result of pulling readable text out of an article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scraped {
    /// Paragraph text long enough to summarize
    Text(String),
    /// The page loaded but yielded too little text (paywall, consent wall, script-only page)
    Insufficient { chars: usize },
    /// The page could not be fetched
    Failed(String),
}

/// Fetches article pages and extracts their text.
#[async_trait::async_trait]
pub trait Scraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Scraped;
}

/// Scraper that GETs the page once and joins the text of every `<p>` element.
pub struct HttpScraper {
    client: Client,
    min_content_chars: usize,
}

impl HttpScraper {
    pub fn new(timeout_secs: u64, user_agent: &str, min_content_chars: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self { client, min_content_chars })
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).context("invalid article URL")?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("unsupported URL scheme: {}", parsed.scheme());
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .context("failed to fetch article page")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("article fetch failed with status: {}", status);
        }

        response.text().await.context("failed to read response body")
    }
}

#[async_trait::async_trait]
impl Scraper for HttpScraper {
    async fn scrape(&self, url: &str) -> Scraped {
        let html = match self.fetch_page(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("scraping: could not fetch {}: {:#}", url, e);
                return Scraped::Failed(format!("{:#}", e));
            }
        };

        let text = extract_paragraph_text(&html);
        let chars = text.chars().count();
        if chars < self.min_content_chars {
            warn!("scraping: only {} chars of paragraph text at {}", chars, url);
            return Scraped::Insufficient { chars };
        }

        info!("scraping: extracted {} chars from {}", chars, url);
        Scraped::Text(text)
    }
}

/// Text of every `<p>` element, one paragraph per line.
pub fn extract_paragraph_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
