//! Server-side rendering of the single feed page.

use html_escape::{encode_double_quoted_attribute, encode_text};
use url::Url;

use crate::llm::summarizer::SummaryOutcome;
use crate::scoring::ScoredArticle;
use crate::sessions::{Notice, NoticeLevel, SessionState};

const STYLE: &str = r#"
body { background: #0A0A0A; color: #CCCCCC; font-family: sans-serif; margin: 0; display: flex; }
aside { background: #141414; width: 22rem; min-height: 100vh; padding: 1.5rem; box-sizing: border-box; }
main { flex: 1; padding: 1.5rem 2.5rem; }
h1, h2, h3 { color: #00A99D; }
a { color: #00C2B2; }
input[type=text] { width: 100%; padding: 0.5em; box-sizing: border-box; }
button { border: 2px solid #00A99D; background: transparent; color: #00A99D; border-radius: 8px;
         padding: 0.5em 1em; font-weight: bold; cursor: pointer; }
button:hover { background: #00A99D; color: #FFFFFF; }
.notice { padding: 0.75rem 1rem; border-radius: 8px; margin-bottom: 0.5rem; }
.notice-info { background: #12324a; } .notice-success { background: #163d22; }
.notice-warning { background: #4a3b12; } .notice-error { background: #4a1616; }
.card { border: 1px solid #424242; border-radius: 10px; padding: 1rem; margin-top: 1rem; background: #1E1E1E; }
.row { display: flex; gap: 2rem; } .row .body { flex: 4; } .row .meter { flex: 1; text-align: center; }
.summary { background: #12324a; border-radius: 8px; padding: 0.75rem 1rem; margin-top: 0.75rem; white-space: pre-wrap; }
"#;

const SUGGESTIONS: &str = r#"<p><strong>Suggestions:</strong></p>
<ul>
<li><strong>Topics:</strong> AI, Startups, Technology, Health, Finance, Climate Change, EV, Space Exploration, Biotechnology</li>
<li><strong>Companies:</strong> Nvidia, Tesla, Reliance, Tata Motors</li>
<li><strong>Places:</strong> Hyderabad, India, Silicon Valley</li>
</ul>"#;

/// Inputs for one render of the page.
pub struct PageContext<'a> {
    pub state: &'a SessionState,
    /// Used for the interests field until the session has topics
    pub default_interests: &'a str,
    pub display_limit: usize,
    /// Pre-formatted date for the heading, e.g. "May 01, 2024"
    pub today: String,
}

pub fn render_page(ctx: &PageContext<'_>) -> String {
    let interests = if ctx.state.topics.is_empty() {
        ctx.default_interests.to_string()
    } else {
        ctx.state.topics.join(", ")
    };

    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Your Personalized News Feed</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str("<aside>\n<h2>Your Interests</h2>\n");
    html.push_str(SUGGESTIONS);
    html.push_str(&format!(
        "\n<form method=\"post\" action=\"/feed\">\n\
         <label for=\"interests\">Enter topics, companies, or places (separated by commas):</label>\n\
         <p><input type=\"text\" id=\"interests\" name=\"interests\" value=\"{}\"></p>\n\
         <button type=\"submit\">Generate My Feed</button>\n</form>\n</aside>\n",
        encode_double_quoted_attribute(&interests)
    ));

    html.push_str("<main>\n<h1>Your Personalized News Feed</h1>\n");
    html.push_str(&format!(
        "<h4>Real-time news for you, updated {}</h4>\n",
        encode_text(&ctx.today)
    ));

    for notice in &ctx.state.notices {
        html.push_str(&render_notice(notice));
    }

    let displayed = ctx.state.displayed(ctx.display_limit);
    if displayed.is_empty() && ctx.state.topics.is_empty() && ctx.state.notices.is_empty() {
        html.push_str(&render_notice(&Notice::info(
            "Enter your topics and click 'Generate My Feed' to get started.",
        )));
    }

    for scored in displayed {
        let summary = ctx.state.summaries.get(&scored.article.url);
        html.push_str(&render_card(scored, summary));
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_notice(notice: &Notice) -> String {
    let class = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "success",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    format!(
        "<div class=\"notice notice-{}\">{}</div>\n",
        class,
        encode_text(&notice.message)
    )
}

fn render_card(scored: &ScoredArticle, summary: Option<&SummaryOutcome>) -> String {
    let article = &scored.article;
    let title = article.title.as_deref().unwrap_or("(untitled)");
    let percent = scored.percent();

    let heading = if is_web_link(&article.url) {
        format!(
            "<h3><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></h3>",
            encode_double_quoted_attribute(&article.url),
            encode_text(title)
        )
    } else {
        format!("<h3>{}</h3>", encode_text(title))
    };

    let summary_html = match summary {
        Some(outcome) => format!(
            "<div class=\"summary\">{}</div>\n",
            encode_text(&outcome.display_text())
        ),
        None => String::new(),
    };

    format!(
        "<div class=\"card\">\n{heading}\n<div class=\"row\">\n<div class=\"body\">\n\
         <p><strong>Source:</strong> {source} | <strong>Published:</strong> {date}</p>\n\
         <p>{description}</p>\n</div>\n<div class=\"meter\">\n<strong>Match Meter:</strong><br>\n\
         <progress value=\"{percent}\" max=\"100\"></progress>\n<h4>{percent}%</h4>\n</div>\n</div>\n\
         <form method=\"post\" action=\"/summarize\">\n\
         <input type=\"hidden\" name=\"url\" value=\"{url}\">\n\
         <button type=\"submit\">Summarize</button>\n</form>\n{summary_html}</div>\n",
        heading = heading,
        source = encode_text(&article.source_name),
        date = encode_text(&article.published_date()),
        description = encode_text(article.description.as_deref().unwrap_or("")),
        percent = percent,
        url = encode_double_quoted_attribute(&article.url),
        summary_html = summary_html,
    )
}

fn is_web_link(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::Article;

    fn scored(url: &str, title: &str, score: f64) -> ScoredArticle {
        ScoredArticle {
            article: Article {
                title: Some(title.to_string()),
                description: Some("A <b>teaser</b>".to_string()),
                url: url.to_string(),
                source_name: "Wire & Co".to_string(),
                published_at: "2024-05-01T10:00:00Z".to_string(),
            },
            score,
        }
    }

    fn ctx(state: &SessionState) -> PageContext<'_> {
        PageContext {
            state,
            default_interests: "AI, Startups, Hyderabad",
            display_limit: 10,
            today: "May 01, 2024".to_string(),
        }
    }

    #[test]
    fn empty_session_shows_defaults_and_hint() {
        let state = SessionState::default();
        let html = render_page(&ctx(&state));

        assert!(html.contains("value=\"AI, Startups, Hyderabad\""));
        assert!(html.contains("Generate My Feed"));
        assert!(html.contains("to get started"));
        assert!(html.contains("updated May 01, 2024"));
    }

    #[test]
    fn untrusted_text_is_escaped() {
        let mut state = SessionState::default();
        state.topics = vec!["\"quoted\"".to_string()];
        state.articles = vec![scored("https://news.test/a?x=1&y=2", "<script>alert(1)</script>", 100.0)];
        let html = render_page(&ctx(&state));

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("A &lt;b&gt;teaser&lt;/b&gt;"));
        assert!(html.contains("Wire &amp; Co"));
        assert!(html.contains("value=\"&quot;quoted&quot;\""));
    }

    #[test]
    fn cards_show_percent_date_and_summary() {
        let mut state = SessionState::default();
        state.topics = vec!["AI".to_string()];
        state.articles = vec![scored("https://news.test/a", "AI funding surges", 66.67)];
        state.summaries.insert("https://news.test/a", SummaryOutcome::TooShort);
        let html = render_page(&ctx(&state));

        assert!(html.contains("<h4>66%</h4>"));
        assert!(html.contains("<progress value=\"66\""));
        assert!(html.contains("<strong>Published:</strong> 2024-05-01"));
        assert!(html.contains("too short or unavailable"));
        assert!(html.contains("href=\"https://news.test/a\""));
    }

    #[test]
    fn only_display_limit_cards_are_rendered() {
        let mut state = SessionState::default();
        state.topics = vec!["AI".to_string()];
        state.articles = (0..15)
            .map(|i| scored(&format!("https://news.test/{}", i), "AI", 100.0))
            .collect();
        let html = render_page(&ctx(&state));

        assert_eq!(html.matches("class=\"card\"").count(), 10);
        assert!(html.contains("https://news.test/9\""));
        assert!(!html.contains("https://news.test/10\""));
    }

    #[test]
    fn non_web_urls_are_not_linked() {
        let mut state = SessionState::default();
        state.topics = vec!["AI".to_string()];
        state.articles = vec![scored("javascript:alert(1)", "AI", 100.0)];
        let html = render_page(&ctx(&state));

        assert!(!html.contains("href=\"javascript"));
    }
}
