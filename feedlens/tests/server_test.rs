use anyhow::Result;
use common::ServerConfig;
use feedlens::llm::{LlmProvider, LlmRequest, LlmResponse, UsageMetadata};
use feedlens::news::{Article, NewsSource};
use feedlens::scraping::{Scraped, Scraper};
use feedlens::server::{build_rocket, AppState};
use feedlens::sessions::handlers::{FeedPolicy, FeedServices};
use feedlens::sessions::SessionStore;
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const ARTICLE_URL: &str = "https://news.test/ai-funding";

struct OneArticle;

#[async_trait::async_trait]
impl NewsSource for OneArticle {
    async fn search(&self, _topics: &[String]) -> Result<Vec<Article>> {
        Ok(vec![Article {
            title: Some("AI funding surges <again>".to_string()),
            description: Some("Investors keep writing cheques.".to_string()),
            url: ARTICLE_URL.to_string(),
            source_name: "Test Wire".to_string(),
            published_at: "2024-05-01T10:00:00Z".to_string(),
        }])
    }
}

struct LongPage;

#[async_trait::async_trait]
impl Scraper for LongPage {
    async fn scrape(&self, _url: &str) -> Scraped {
        Scraped::Text("Venture capital continued to flow into artificial intelligence. ".repeat(6))
    }
}

struct FixedLlm;

#[async_trait::async_trait]
impl LlmProvider for FixedLlm {
    async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse> {
        Ok(LlmResponse {
            content: "Funding is up.".to_string(),
            usage: UsageMetadata::default(),
            model: "fixed".to_string(),
        })
    }
}

async fn client() -> Client {
    let services = FeedServices {
        news: Arc::new(OneArticle),
        scraper: Arc::new(LongPage),
        llm: Arc::new(FixedLlm),
        policy: FeedPolicy::default(),
    };
    let state = AppState::new(services, SessionStore::new(Duration::from_secs(600)), "AI, Startups, Hyderabad");

    Client::tracked(build_rocket(state, &ServerConfig::default()))
        .await
        .expect("valid rocket instance")
}

async fn feed_json(client: &Client) -> Value {
    let response = client.get("/api/v1/feed").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    response.into_json::<Value>().await.expect("json body")
}

#[rocket::async_test]
async fn index_renders_empty_page() {
    let client = client().await;

    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::HTML));

    let body = response.into_string().await.unwrap_or_default();
    assert!(body.contains("Generate My Feed"));
    assert!(body.contains("AI, Startups, Hyderabad"));
    assert!(body.contains("to get started"));
}

#[rocket::async_test]
async fn feed_then_summarize_round_trip() {
    let client = client().await;

    let response = client
        .post("/feed")
        .header(ContentType::Form)
        .body("interests=AI%2C+ai%2C+Funding")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/"));

    let feed = feed_json(&client).await;
    assert_eq!(feed["topics"], serde_json::json!(["AI", "Funding"]));
    assert_eq!(feed["retained"], 1);
    assert_eq!(feed["articles"][0]["url"], ARTICLE_URL);
    assert_eq!(feed["articles"][0]["percent"], 100);
    assert!(feed["articles"][0]["summary"].is_null());
    assert_eq!(feed["notices"][0]["level"], "success");

    let page = client.get("/").dispatch().await.into_string().await.unwrap_or_default();
    assert!(page.contains("AI funding surges &lt;again&gt;"));
    assert!(page.contains("100%"));

    let response = client
        .post("/summarize")
        .header(ContentType::Form)
        .body(format!("url={}", "https%3A%2F%2Fnews.test%2Fai-funding"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);

    let feed = feed_json(&client).await;
    assert_eq!(feed["articles"][0]["summary"]["kind"], "generated");
    assert_eq!(feed["articles"][0]["summary"]["text"], "Funding is up.");
    assert_eq!(feed["notices"], serde_json::json!([]));
}

#[rocket::async_test]
async fn blank_interests_warn() {
    let client = client().await;

    let response = client
        .post("/feed")
        .header(ContentType::Form)
        .body("interests=+%2C+")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);

    let feed = feed_json(&client).await;
    assert_eq!(feed["notices"][0]["level"], "warning");
    assert_eq!(feed["notices"][0]["message"], "Please enter at least one topic.");
    assert_eq!(feed["articles"], serde_json::json!([]));
}

#[rocket::async_test]
async fn health_and_status() {
    let client = client().await;

    let response = client.get("/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_string().await.as_deref(), Some("OK"));

    client.get("/").dispatch().await;
    client.post("/feed").header(ContentType::Form).body("interests=AI").dispatch().await;

    let status: Value = client
        .get("/api/v1/status")
        .dispatch()
        .await
        .into_json()
        .await
        .expect("json body");
    assert_eq!(status["status"], "ok");
    assert_eq!(status["active_sessions"], 1);
}
