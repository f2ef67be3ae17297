//! The two user actions, as functions from (current state, action) to new state.
//!
//! Neither returns an error: upstream failures end up as [`Notice`]s and tagged
//! outcomes inside the returned [`SessionState`].

use common::FeedConfig;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{Notice, SessionState, SummaryCache};
use crate::llm::summarizer::{summarize_article, SummaryOutcome};
use crate::llm::LlmProvider;
use crate::news::NewsSource;
use crate::scoring::rank_articles;
use crate::scraping::{Scraped, Scraper};
use crate::topics::parse_topics;

/// Ranking and display rules applied to every fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedPolicy {
    /// Keep articles scoring strictly above this
    pub min_score: f64,
    pub display_limit: usize,
}

impl Default for FeedPolicy {
    fn default() -> Self {
        Self { min_score: 20.0, display_limit: 10 }
    }
}

impl From<&FeedConfig> for FeedPolicy {
    fn from(cfg: &FeedConfig) -> Self {
        Self { min_score: cfg.min_score, display_limit: cfg.display_limit }
    }
}

/// The external collaborators the handlers talk to.
#[derive(Clone)]
pub struct FeedServices {
    pub news: Arc<dyn NewsSource>,
    pub scraper: Arc<dyn Scraper>,
    pub llm: Arc<dyn LlmProvider>,
    pub policy: FeedPolicy,
}

/// "Generate my feed": parse `input`, search, score, rank.
///
/// Without topics nothing is fetched and `previous` is returned with only its
/// notices replaced. Otherwise the result is a brand-new state: new topics,
/// new ranking, empty summary cache.
pub async fn handle_generate_feed(
    services: &FeedServices,
    previous: SessionState,
    input: &str,
) -> SessionState {
    let topics = parse_topics(input);
    if topics.is_empty() {
        debug!("feed: no topics entered, nothing fetched");
        return SessionState {
            notices: vec![Notice::warning("Please enter at least one topic.")],
            ..previous
        };
    }

    let topic_list = topics.join(", ");
    let mut notices = Vec::new();

    let fetched = match services.news.search(&topics).await {
        Ok(articles) => articles,
        Err(e) => {
            error!(topics = %topic_list, "feed: news search failed: {:#}", e);
            notices.push(Notice::error(format!("Failed to fetch news. Error: {:#}", e)));
            Vec::new()
        }
    };

    let fetched_count = fetched.len();
    let articles = rank_articles(fetched, &topics, services.policy.min_score);

    if fetched_count == 0 {
        notices.push(Notice::error(format!(
            "No relevant articles found for {}. Try different topics.",
            topic_list
        )));
    } else if articles.is_empty() {
        notices.push(Notice::info(format!(
            "None of the {} articles fetched for {} matched enough of your topics. Try different topics.",
            fetched_count, topic_list
        )));
    } else {
        notices.push(Notice::success(format!(
            "Found {} relevant articles for your topics: {}",
            articles.len(),
            topic_list
        )));
    }

    info!(
        topics = %topic_list,
        fetched = fetched_count,
        retained = articles.len(),
        "feed: generated"
    );

    SessionState {
        topics,
        articles,
        summaries: SummaryCache::default(),
        notices,
    }
}

/// "Summarize": summarize the article at `url`, once per session.
///
/// The page is scraped first; when that yields nothing usable the article's
/// description is summarized instead and a warning says so.
pub async fn handle_summarize(
    services: &FeedServices,
    mut session: SessionState,
    url: &str,
) -> SessionState {
    session.notices.clear();

    let description = match session.find_article(url) {
        Some(scored) => scored.article.description.clone(),
        None => {
            warn!(%url, "summarize: article not in the current feed");
            session
                .notices
                .push(Notice::warning("That article is no longer in your feed. Generate the feed again."));
            return session;
        }
    };

    if session.summaries.contains(url) {
        debug!(%url, "summarize: using cached summary");
        return session;
    }

    let outcome = match services.scraper.scrape(url).await {
        Scraped::Text(text) => summarize_article(services.llm.as_ref(), Some(&text)).await,
        fallback => {
            if let Scraped::Failed(reason) = &fallback {
                session
                    .notices
                    .push(Notice::warning(format!("Could not fetch article for scraping. Error: {}", reason)));
            }
            session
                .notices
                .push(Notice::warning("Scraping failed. Summarizing the short description instead."));
            summarize_article(services.llm.as_ref(), description.as_deref()).await
        }
    };

    match &outcome {
        SummaryOutcome::Generated(_) => info!(%url, "summarize: summary stored"),
        SummaryOutcome::TooShort => info!(%url, "summarize: content too short"),
        SummaryOutcome::Failed(reason) => warn!(%url, %reason, "summarize: provider failed"),
    }

    session.summaries.insert(url, outcome);
    session
}
