//! Keyword-ranked news feed: topic parsing, NewsAPI search, scoring,
//! paragraph scraping and Gemini summaries, served by Rocket.

pub mod llm;
pub mod news;
pub mod page;
pub mod scoring;
pub mod scraping;
pub mod server;
pub mod sessions;
pub mod topics;
