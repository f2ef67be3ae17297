use serde::Serialize;

use crate::news::Article;

/// An article paired with its match score, a percentage in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredArticle {
    pub article: Article,
    pub score: f64,
}

impl ScoredArticle {
    /// Whole-number percentage shown in the match meter (truncated, not rounded).
    pub fn percent(&self) -> u8 {
        self.score.clamp(0.0, 100.0) as u8
    }
}

/// Percentage of `topics` found as case-insensitive substrings of the
/// article's title followed by its description. Each topic counts once.
pub fn match_score(article: &Article, topics: &[String]) -> f64 {
    if topics.is_empty() {
        return 0.0;
    }

    let content = format!(
        "{}{}",
        article.title.as_deref().unwrap_or(""),
        article.description.as_deref().unwrap_or("")
    )
    .to_lowercase();

    let matched = topics
        .iter()
        .filter(|topic| content.contains(&topic.to_lowercase()))
        .count();

    (matched as f64 * 100.0 / topics.len() as f64).min(100.0)
}

/// Retention rule: strictly above the threshold.
pub fn passes_threshold(score: f64, min_score: f64) -> bool {
    score > min_score
}

/// Score every article, keep those above `min_score`, best first.
///
/// The sort is stable, so equal scores keep the order the service returned
/// them in (newest first).
pub fn rank_articles(articles: Vec<Article>, topics: &[String], min_score: f64) -> Vec<ScoredArticle> {
    let mut scored: Vec<ScoredArticle> = articles
        .into_iter()
        .map(|article| {
            let score = match_score(&article, topics);
            ScoredArticle { article, score }
        })
        .filter(|s| passes_threshold(s.score, min_score))
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}
