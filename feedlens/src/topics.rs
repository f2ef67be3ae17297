/// Split the free-text interests field into topics.
///
/// Pieces are separated by commas and trimmed; empty pieces are dropped, as are
/// later pieces that repeat an earlier one ignoring case. The first spelling is
/// kept so the acknowledgement echoes what the user typed.
pub fn parse_topics(raw: &str) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();

    for piece in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let folded = piece.to_lowercase();
        if topics.iter().any(|t| t.to_lowercase() == folded) {
            continue;
        }
        topics.push(piece.to_string());
    }

    topics
}

/// Query string understood by the news search service.
pub fn build_query(topics: &[String]) -> String {
    topics.join(" OR ")
}
