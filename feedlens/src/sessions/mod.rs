use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::llm::summarizer::SummaryOutcome;
use crate::scoring::ScoredArticle;

pub mod handlers;

/// Severity of a transient message shown above the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A message produced by the last action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Summaries computed in this session, keyed by article url.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryCache {
    entries: HashMap<String, SummaryOutcome>,
}

impl SummaryCache {
    pub fn get(&self, url: &str) -> Option<&SummaryOutcome> {
        self.entries.get(url)
    }

    pub fn insert(&mut self, url: impl Into<String>, outcome: SummaryOutcome) {
        self.entries.insert(url.into(), outcome);
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything one user's feed consists of.
///
/// A fetch action replaces `topics`, `articles` and `summaries` together;
/// `notices` are replaced by every action.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub topics: Vec<String>,
    /// Articles above the score threshold, best first
    pub articles: Vec<ScoredArticle>,
    pub summaries: SummaryCache,
    pub notices: Vec<Notice>,
}

impl SessionState {
    pub fn find_article(&self, url: &str) -> Option<&ScoredArticle> {
        self.articles.iter().find(|s| s.article.url == url)
    }

    /// The articles rendered on the page.
    pub fn displayed(&self, limit: usize) -> &[ScoredArticle] {
        &self.articles[..self.articles.len().min(limit)]
    }
}

struct StoredSession {
    state: SessionState,
    last_seen: Instant,
}

/// In-memory sessions for the web server, one [`SessionState`] per browser.
///
/// Handlers work on a snapshot and write the new state back, so the lock is
/// never held while a request to an upstream service is in flight. Two
/// overlapping actions from the same browser resolve as last-write-wins.
/// At most `max_sessions` are held; past that the least recently seen session
/// is evicted.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, StoredSession>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            max_sessions: 10_000,
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Copy of the session's state; a fresh state for unknown ids.
    pub async fn snapshot(&self, id: Uuid) -> SessionState {
        let mut sessions = self.sessions.lock().await;
        self.prune(&mut sessions);
        match sessions.get_mut(&id) {
            Some(stored) => {
                stored.last_seen = Instant::now();
                stored.state.clone()
            }
            None => SessionState::default(),
        }
    }

    pub async fn store(&self, id: Uuid, state: SessionState) {
        let mut sessions = self.sessions.lock().await;
        self.prune(&mut sessions);
        sessions.insert(id, StoredSession { state, last_seen: Instant::now() });

        while sessions.len() > self.max_sessions {
            let oldest = sessions
                .iter()
                .filter(|(key, _)| **key != id)
                .min_by_key(|(_, s)| s.last_seen)
                .map(|(key, _)| *key);
            match oldest {
                Some(key) => {
                    sessions.remove(&key);
                    debug!(session = %key, "sessions: evicted least recently seen session");
                }
                None => break,
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    fn prune(&self, sessions: &mut HashMap<Uuid, StoredSession>) {
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, s| s.last_seen.elapsed() < ttl);
        let dropped = before - sessions.len();
        if dropped > 0 {
            debug!(dropped, "sessions: pruned idle sessions");
        }
    }
}
