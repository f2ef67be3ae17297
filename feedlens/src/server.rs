use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, Utc};
use common::{Config, Secrets, ServerConfig};
use rocket::form::Form;
use rocket::http::{Cookie, CookieJar};
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{get, post, routes, uri, Build, FromForm, Rocket, State};
use serde::Serialize;
use uuid::Uuid;

use crate::llm::create_llm_provider;
use crate::llm::summarizer::SummaryOutcome;
use crate::news::{Article, NewsApiClient};
use crate::page::{render_page, PageContext};
use crate::scraping::HttpScraper;
use crate::sessions::handlers::{handle_generate_feed, handle_summarize, FeedPolicy, FeedServices};
use crate::sessions::{Notice, SessionStore};

const SESSION_COOKIE: &str = "feedlens_session";

/// Application state stored inside Rocket managed state.
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub services: FeedServices,
    pub sessions: SessionStore,
    pub default_interests: String,
}

impl AppState {
    pub fn new(services: FeedServices, sessions: SessionStore, default_interests: impl Into<String>) -> Self {
        Self {
            started_at: Utc::now(),
            services,
            sessions,
            default_interests: default_interests.into(),
        }
    }

    /// Wire the real news, scraping and LLM clients from configuration.
    pub fn from_config(config: &Config, secrets: &Secrets) -> Result<Self> {
        let news = NewsApiClient::new(&config.news.api_url, &secrets.news_api_key, config.news.timeout_seconds)?
            .with_filters(&config.news.language, &config.news.sort_by, config.news.page_size);
        let scraper = HttpScraper::new(
            config.scraping.timeout_seconds,
            &config.scraping.user_agent,
            config.scraping.min_content_chars,
        )?;
        let llm = create_llm_provider(&config.llm, &secrets.llm_api_key);

        let services = FeedServices {
            news: Arc::new(news),
            scraper: Arc::new(scraper),
            llm,
            policy: FeedPolicy::from(&config.feed),
        };
        let sessions = SessionStore::new(config.server.session_ttl()).with_max_sessions(config.server.max_sessions);

        Ok(Self::new(services, sessions, &config.feed.default_interests))
    }
}

/// Session id from the private cookie, minting a new one when absent or unreadable.
fn session_id(jar: &CookieJar<'_>) -> Uuid {
    if let Some(id) = jar
        .get_private(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
    {
        return id;
    }
    let id = Uuid::new_v4();
    jar.add_private(Cookie::new(SESSION_COOKIE, id.to_string()));
    id
}

#[derive(FromForm)]
struct FeedForm {
    interests: Option<String>,
}

#[derive(FromForm)]
struct SummarizeForm {
    url: String,
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    active_sessions: usize,
}

/// JSON view of a session; summaries keep their outcome tag.
#[derive(Serialize)]
struct FeedView {
    topics: Vec<String>,
    retained: usize,
    articles: Vec<ArticleView>,
    notices: Vec<Notice>,
}

#[derive(Serialize)]
struct ArticleView {
    #[serde(flatten)]
    article: Article,
    score: f64,
    percent: u8,
    summary: Option<SummaryOutcome>,
}

#[get("/")]
async fn index(state: &State<AppState>, jar: &CookieJar<'_>) -> RawHtml<String> {
    let id = session_id(jar);
    let session = state.sessions.snapshot(id).await;

    RawHtml(render_page(&PageContext {
        state: &session,
        default_interests: &state.default_interests,
        display_limit: state.services.policy.display_limit,
        today: Local::now().format("%B %d, %Y").to_string(),
    }))
}

#[post("/feed", data = "<form>")]
async fn generate_feed(form: Form<FeedForm>, state: &State<AppState>, jar: &CookieJar<'_>) -> Redirect {
    let id = session_id(jar);
    let input = form.into_inner().interests.unwrap_or_default();

    let previous = state.sessions.snapshot(id).await;
    let next = handle_generate_feed(&state.services, previous, &input).await;
    state.sessions.store(id, next).await;

    Redirect::to(uri!(index))
}

#[post("/summarize", data = "<form>")]
async fn summarize(form: Form<SummarizeForm>, state: &State<AppState>, jar: &CookieJar<'_>) -> Redirect {
    let id = session_id(jar);
    let url = form.into_inner().url;

    let previous = state.sessions.snapshot(id).await;
    let next = handle_summarize(&state.services, previous, &url).await;
    state.sessions.store(id, next).await;

    Redirect::to(uri!(index))
}

#[get("/api/v1/feed")]
async fn feed_json(state: &State<AppState>, jar: &CookieJar<'_>) -> Json<FeedView> {
    let id = session_id(jar);
    let session = state.sessions.snapshot(id).await;

    let articles = session
        .displayed(state.services.policy.display_limit)
        .iter()
        .map(|scored| ArticleView {
            article: scored.article.clone(),
            score: scored.score,
            percent: scored.percent(),
            summary: session.summaries.get(&scored.article.url).cloned(),
        })
        .collect();

    Json(FeedView {
        retained: session.articles.len(),
        topics: session.topics,
        articles,
        notices: session.notices,
    })
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

/// Status endpoint returning simple JSON with uptime and session count.
#[get("/api/v1/status")]
async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let uptime = (Utc::now() - state.started_at).num_seconds();

    Json(StatusResponse {
        status: "ok",
        uptime_seconds: uptime,
        active_sessions: state.sessions.len().await,
    })
}

/// Build the Rocket instance with managed state, bound per `[server]`.
pub fn build_rocket(state: AppState, server: &ServerConfig) -> Rocket<Build> {
    let fig = rocket::Config::figment()
        .merge(("address", server.bind.clone()))
        .merge(("port", server.port));

    rocket::custom(fig).manage(state).mount(
        "/",
        routes![index, generate_feed, summarize, feed_json, health, status],
    )
}

/// Build and launch the Rocket server.
///
/// This function blocks until the Rocket server shuts down.
pub async fn launch_rocket(state: AppState, server: &ServerConfig) -> Result<()> {
    tracing::info!("Starting Rocket HTTP server on {}:{}", server.bind, server.port);
    build_rocket(state, server)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
